use anyhow::Result;
use ellipsoids::medium::MediaTable;
use ellipsoids::registry::Registry;
use ellipsoids::settings;
use ellipsoids::surface::INSIDE;
use ellipsoids::tracker::run_batch;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = settings::load_config()?;
    println!("{}", settings);

    let mut media = MediaTable::new();
    let surface = Registry::default().build(&settings.geometry, &mut media)?;
    println!("{}", surface.describe());

    let seed = settings.seed.unwrap_or_else(rand::random);
    let tally = run_batch(surface.as_ref(), &settings.source, settings.histories, seed);

    let medium = surface
        .medium(INSIDE)
        .and_then(|m| media.name(m))
        .unwrap_or("vacuum");
    println!("Results:");
    println!("  - Histories: {}", tally.histories);
    println!("  - Hit fraction: {:.6}", tally.hit_fraction());
    println!("  - Boundary crossings: {}", tally.crossings);
    println!(
        "  - Mean path length in {}: {:.6}",
        medium,
        tally.mean_interior_length()
    );

    Ok(())
}
