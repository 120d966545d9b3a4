use std::sync::Arc;

use anyhow::Result;
use worldweather_core::Config;
use worldweather_fetch::{FetchSlot, WeatherFetchPipeline, WeatherService};

fn main() -> Result<()> {
    // Initialize core
    worldweather_core::init()?;

    // Missing API key fails here, before any request
    let (config, _) = Config::load_validated()?;
    let pipeline = Arc::new(WeatherFetchPipeline::new(&config.weather)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("worldweather-tokio")
        .build()?;

    let (service, rx) = WeatherService::new(pipeline, runtime.handle().clone());

    tracing::info!("WorldWeather started");

    let locations: Vec<String> = std::env::args().skip(1).collect();
    if locations.is_empty() {
        println!("Usage: worldweather <location>...");
        println!("  Config file: {}", Config::config_path()?.display());
        return Ok(());
    }

    for location in &locations {
        let mut slot = FetchSlot::default();
        let request_id = service.request_fetch(location);
        slot.begin(request_id, location);

        let Ok(message) = rx.recv() else {
            tracing::error!("Weather service channel closed");
            break;
        };
        slot.apply(message);

        render(&slot);
    }

    Ok(())
}

fn render(slot: &FetchSlot) {
    match slot {
        FetchSlot::Ready {
            location,
            reading,
            category,
        } => {
            let region = reading.map_region();
            println!("City: {}", location);
            println!("{}", reading.summary());
            println!("Effect: {} ({})", category, category.icon_name());
            if let Some(sound) = category.sound_asset() {
                println!("Sound: {}", sound);
            }
            println!(
                "Map: {:.4}, {:.4} (span {}°)",
                region.center_latitude, region.center_longitude, region.latitude_delta
            );
        }
        FetchSlot::Failed {
            location,
            message,
            detail,
            ..
        } => {
            println!("City: {}", location);
            println!("{}", message);
            tracing::debug!("Fetch failed: {}", detail);
        }
        FetchSlot::Idle | FetchSlot::Pending { .. } => {}
    }
    println!();
}
