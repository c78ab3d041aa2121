use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};

use ski_tycoon_v2::{Game, GameConfig, Scenario, Terrain, TerrainLibrary, TerrainRecipe};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let library = match &options.library {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario library {path}"))?;
            TerrainLibrary::from_xml(&xml)
                .with_context(|| format!("failed to parse scenario library {path}"))?
        }
        None => TerrainLibrary::default(),
    };

    if options.summary_only {
        println!("Scenarios:");
        for (index, name) in library.names().enumerate() {
            println!("  {index}: {name}");
        }
        return Ok(());
    }

    let (library, scenario) = match &options.pgm {
        Some(path) => {
            let pgm = fs::read_to_string(path)
                .with_context(|| format!("failed to read heightmap {path}"))?;
            let recipe = TerrainRecipe::Heightmap {
                pgm,
                scaling: options.scaling,
            };
            (TerrainLibrary::new(vec![Scenario::new(path.as_str(), recipe)]), 0)
        }
        None => {
            let index = resolve_scenario(&library, options.scenario.as_deref())?;
            (library, index)
        }
    };

    let config = GameConfig {
        scenario,
        ..GameConfig::default()
    };
    let mut game = Game::with_library(config, library)?;
    let name = game
        .library()
        .get(scenario)
        .map(|scenario| scenario.name.clone())
        .unwrap_or_default();
    println!("Scenario: {name}");

    let before = terrain_stats(&game)?;
    println!("Grid: {}x{}", before.width, before.depth);
    println!("Volume before: {:.3}", before.volume);

    for _ in 0..options.steps {
        game.update();
    }

    let after = terrain_stats(&game)?;
    println!("Steps: {}", options.steps);
    println!("Volume after: {:.3}", after.volume);
    println!("Height range: {:.3}..{:.3}", after.min, after.max);
    Ok(())
}

fn resolve_scenario(library: &TerrainLibrary, selector: Option<&str>) -> Result<usize> {
    let Some(selector) = selector else {
        return Ok(0);
    };
    if let Ok(index) = selector.parse::<usize>() {
        return library
            .get(index)
            .map(|_| index)
            .ok_or_else(|| anyhow!("no scenario at index {index} ({} available)", library.len()));
    }
    library
        .find(selector)
        .map(|(index, _)| index)
        .ok_or_else(|| {
            let names = library.names().collect::<Vec<_>>().join(", ");
            anyhow!("unknown scenario {selector:?}. Available: {names}")
        })
}

struct TerrainStats {
    width: u32,
    depth: u32,
    volume: f32,
    min: f32,
    max: f32,
}

fn terrain_stats(game: &Game) -> Result<TerrainStats> {
    let terrain: &Terrain = game
        .world()
        .terrains()
        .next()
        .ok_or_else(|| anyhow!("scenario did not create any terrain"))?;
    let (min, max) = terrain.height_range();
    Ok(TerrainStats {
        width: terrain.dimensions().x,
        depth: terrain.dimensions().y,
        volume: terrain.volume(),
        min,
        max,
    })
}

struct CliOptions {
    scenario: Option<String>,
    library: Option<String>,
    pgm: Option<String>,
    scaling: f32,
    steps: u32,
    summary_only: bool,
}

impl CliOptions {
    const USAGE: &'static str = "Usage: ski-tycoon [--scenario NAME|INDEX] [--library FILE.xml] \
                                 [--pgm FILE [--scaling S]] [--steps N] [--summary-only]";

    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            scenario: None,
            library: None,
            pgm: None,
            scaling: 1.0,
            steps: 1,
            summary_only: false,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} expects a value. {}", Self::USAGE))
            };
            match arg.as_str() {
                "--scenario" => options.scenario = Some(value("--scenario")?),
                "--library" => options.library = Some(value("--library")?),
                "--pgm" => options.pgm = Some(value("--pgm")?),
                "--scaling" => {
                    let raw = value("--scaling")?;
                    options.scaling = raw
                        .parse()
                        .map_err(|_| anyhow!("invalid --scaling value {raw:?}"))?;
                }
                "--steps" => {
                    let raw = value("--steps")?;
                    options.steps = raw
                        .parse()
                        .map_err(|_| anyhow!("invalid --steps value {raw:?}"))?;
                }
                "--summary-only" => options.summary_only = true,
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {}", Self::USAGE));
                }
            }
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let options =
            CliOptions::parse(args(&["--scenario", "2", "--steps", "5", "--scaling", "3"]))
                .unwrap();
        assert_eq!(options.scenario.as_deref(), Some("2"));
        assert_eq!(options.steps, 5);
        assert_eq!(options.scaling, 3.0);
        assert!(!options.summary_only);
    }

    #[test]
    fn rejects_missing_values_and_unknown_flags() {
        assert!(CliOptions::parse(args(&["--steps"])).is_err());
        assert!(CliOptions::parse(args(&["--steps", "many"])).is_err());
        assert!(CliOptions::parse(args(&["--fast"])).is_err());
    }

    #[test]
    fn resolves_scenarios_by_index_or_name() {
        let library = TerrainLibrary::default();
        assert_eq!(resolve_scenario(&library, None).unwrap(), 0);
        assert_eq!(resolve_scenario(&library, Some("1")).unwrap(), 1);
        assert_eq!(resolve_scenario(&library, Some("many droplets")).unwrap(), 2);
        assert!(resolve_scenario(&library, Some("9")).is_err());
        assert!(resolve_scenario(&library, Some("Avalanche")).is_err());
    }
}
