use career_choice::{
    simulate_known_values, simulate_priors, simulate_with_switching, CareerParams, DEFAULT_SEED,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("========================================");
    println!("Career Choice under Noisy Priors");
    println!("========================================");

    let params = CareerParams::default();
    println!(
        "\nJ = {}, N = {}, K = {}, sigma = {}, v = {:?}, c = {}, seed = {}",
        params.num_tracks,
        params.num_graduates,
        params.num_draws,
        params.sigma,
        params.values,
        params.switching_cost,
        DEFAULT_SEED
    );

    let known = simulate_known_values(&params, DEFAULT_SEED)?;
    println!("\nKnown values");
    println!("{:<8} {:>10} {:>10}", "Track", "E[u]", "avg u");
    for (j, (e, r)) in known
        .expected_utility
        .iter()
        .zip(&known.average_realized_utility)
        .enumerate()
    {
        println!("{:<8} {:>10.3} {:>10.3}", j + 1, e, r);
    }

    println!("\nChoices from friends' experiences");
    println!(
        "{:<9} {:>7} {:>8} {:>8} {:>8} {:>10} {:>10}",
        "Graduate", "Friends", "Track 1", "Track 2", "Track 3", "Subj. E[u]", "Realised"
    );
    for g in simulate_priors(&params, DEFAULT_SEED)? {
        let shares: Vec<String> = g.choice_shares.iter().map(|s| format!("{:>8.3}", s)).collect();
        println!(
            "{:<9} {:>7} {} {:>10.3} {:>10.3}",
            g.graduate,
            g.friends,
            shares.join(" "),
            g.subjective_expected_utility,
            g.realized_utility
        );
    }

    println!("\nSecond year with switching (share switching, by first-year track)");
    println!(
        "{:<9} {:>8} {:>8} {:>8} {:>10} {:>10}",
        "Graduate", "From 1", "From 2", "From 3", "Subj. E[u]", "Realised"
    );
    for s in simulate_with_switching(&params, DEFAULT_SEED)? {
        let shares: Vec<String> = s
            .switch_shares
            .iter()
            .map(|share| match share {
                Some(x) => format!("{:>8.3}", x),
                None => format!("{:>8}", "-"),
            })
            .collect();
        println!(
            "{:<9} {} {:>10.3} {:>10.3}",
            s.second_year.graduate,
            shares.join(" "),
            s.second_year.subjective_expected_utility,
            s.second_year.realized_utility
        );
    }

    Ok(())
}
