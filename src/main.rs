use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use log::info;
use miband::{BandConfig, BluestTransport, HeartRateTag, LedColor, MiBand, VibrationMode};

const USAGE: &str = "usage: miband <address> [vibrate <led|10x|plain>] [led <red|blue|orange|green>] [heart-rate] [--mi-band-2]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let address = args.first().ok_or(anyhow!(USAGE))?.clone();

    let tag = if args.iter().any(|arg| arg == "--mi-band-2") {
        HeartRateTag::MI_BAND_2
    } else {
        HeartRateTag::MI_BAND_1S
    };
    let config = BandConfig::default()
        .with_heart_rate_tag(tag)
        .with_operation_timeout(Duration::from_secs(10))
        .with_connect_timeout(Duration::from_secs(45));

    let (transport, events) = BluestTransport::new().await?;
    let band = Arc::new(MiBand::with_config(transport, config));
    let pump = band.clone();
    tokio::spawn(async move { pump.pump_events(events).await });

    band.on_disconnected(|| info!("Band disconnected"));
    band.connect(&address).await.context("connect")?;
    band.pair().await.context("pair")?;

    println!("RSSI: {} dBm", band.read_rssi().await?);
    println!("{:?}", band.battery_info().await?);

    let mut rest = args[1..].iter();
    while let Some(command) = rest.next() {
        match command.as_str() {
            "vibrate" => {
                let mode: VibrationMode = rest.next().ok_or(anyhow!(USAGE))?.parse()?;
                band.start_vibration(mode).await?;
                tokio::time::sleep(Duration::from_secs(2)).await;
                band.stop_vibration().await?;
            }
            "led" => {
                let color: LedColor = rest.next().ok_or(anyhow!(USAGE))?.parse()?;
                println!("LED set to {:?}", band.set_led_color(color).await?);
            }
            "heart-rate" => {
                band.register_heart_rate_listener(|bpm| println!("Heart rate: {bpm} bpm"))?;
                band.start_heart_rate_scan().await?;
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            "--mi-band-2" => {}
            other => return Err(anyhow!("unknown command {other}\n{USAGE}")),
        }
    }

    band.disconnect()?;
    Ok(())
}
