//! Transport registration and dispatch
//!
//! This module provides a centralized registry for all transports, with
//! support for feature-gated inclusion and dynamic help text generation.

use crate::error::CliError;
use rft8xx_core::bus::{Framing, Transport};
use rft8xx_core::chip::ChipMap;

/// Boxed transport as used by a CLI session
pub type BoxedTransport = Box<dyn Transport + Send>;

/// Information about a transport
pub struct TransportInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available transports (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "sim")]
    transports.push(TransportInfo {
        name: "sim",
        aliases: &["dummy"],
        description: "Simulated chip (step=<commands per poll>,calibration=<result>)",
    });

    #[cfg(feature = "linux-spi")]
    transports.push(TransportInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev interface (dev=/dev/spidevX.Y,spispeed=<kHz>,fastspeed=<kHz>,mode=<0-3>)",
    });

    transports
}

/// Generate help text listing all available transports
pub fn transport_help() -> String {
    let transports = available_transports();

    if transports.is_empty() {
        return "No transports available (recompile with transport features enabled)".to_string();
    }

    let mut help = String::from("Available transports:\n");
    for t in &transports {
        help.push_str(&format!("  {:12} - {}\n", t.name, t.description));
    }
    help
}

/// Generate a short list of transport names for CLI help
pub fn transport_names_short() -> String {
    let transports = available_transports();
    let names: Vec<&str> = transports.iter().map(|t| t.name).collect();
    names.join(", ")
}

/// Resolve a transport name or alias to its primary name
pub fn find_transport(name: &str) -> Option<&'static str> {
    available_transports()
        .into_iter()
        .find(|t| t.name == name || t.aliases.iter().any(|a| *a == name))
        .map(|t| t.name)
}

/// Parse a transport string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_transport_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the transport described by `spec`
///
/// `map` and `framing` are passed on to transports that emulate the chip.
#[allow(unused_variables)]
pub fn open_transport(
    spec: &str,
    map: &'static ChipMap,
    framing: Framing,
) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    let (name, options) = parse_transport_string(spec);

    let canonical_name =
        find_transport(name).ok_or_else(|| CliError::UnknownTransport(name.to_string()))?;

    match canonical_name {
        #[cfg(feature = "sim")]
        "sim" => {
            let config = sim_config(&options, map, framing)?;
            log::info!("Opening simulated {} chip...", map.name);
            Ok(Box::new(rft8xx_sim::SimChip::new(config)))
        }

        #[cfg(feature = "linux-spi")]
        "linux_spi" => {
            log::info!("Opening Linux SPI transport...");
            rft8xx_linux_spi::open_linux_spi(&options).map_err(|e| {
                Box::<dyn std::error::Error>::from(format!(
                    "Failed to open Linux SPI device: {}\n\
                     Make sure the device exists and you have read/write permissions.",
                    e
                ))
            })
        }

        _ => Err(CliError::UnknownTransport(name.to_string()).into()),
    }
}

#[cfg(feature = "sim")]
fn sim_config(
    options: &[(&str, &str)],
    map: &'static ChipMap,
    framing: Framing,
) -> Result<rft8xx_sim::SimConfig, CliError> {
    let mut config = rft8xx_sim::SimConfig {
        map,
        read_dummy_bytes: framing.read_dummy_bytes,
        ..Default::default()
    };
    let invalid = |message: String| CliError::InvalidOptions {
        transport: "sim".to_string(),
        message,
    };

    for (key, value) in options {
        match *key {
            "step" => {
                config.commands_per_poll = value
                    .parse()
                    .map_err(|_| invalid(format!("Invalid step value: {}", value)))?;
            }
            "calibration" => {
                config.calibration_result = value
                    .parse()
                    .map_err(|_| invalid(format!("Invalid calibration value: {}", value)))?;
            }
            _ => log::warn!("sim: Unknown option: {}={}", key, value),
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transport_string() {
        assert_eq!(parse_transport_string("sim"), ("sim", vec![]));
        assert_eq!(
            parse_transport_string("linux_spi:dev=/dev/spidev0.0,spispeed=8000"),
            ("linux_spi", vec![("dev", "/dev/spidev0.0"), ("spispeed", "8000")])
        );
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_sim_options() {
        use rft8xx_core::chip::FT81X;

        assert_eq!(find_transport("dummy"), Some("sim"));
        let config = sim_config(
            &[("step", "2"), ("calibration", "0")],
            &FT81X,
            Framing::with_read_dummy_bytes(2),
        )
        .unwrap();
        assert_eq!(config.commands_per_poll, 2);
        assert_eq!(config.calibration_result, 0);
        assert_eq!(config.read_dummy_bytes, 2);
        assert!(sim_config(&[("step", "x")], &FT81X, Framing::default()).is_err());
    }

    #[test]
    fn test_unknown_transport() {
        assert!(find_transport("ch341a").is_none());
    }
}
