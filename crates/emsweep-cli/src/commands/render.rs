use crate::cli::RenderArgs;
use crate::config::defaults::DefaultsConfig;
use crate::error::{CliError, Result};
use emsweep::core::energy::EnergyPoint;
use emsweep::core::template::{DEFAULT_PLACEHOLDER, MacroTemplate, TESTEM1_MUON_COPPER};
use emsweep::engine::error::EngineError;
use tracing::info;

pub async fn run(args: RenderArgs) -> Result<()> {
    let text = render_macro(&args)?;
    print!("{}", text);
    Ok(())
}

fn render_macro(args: &RenderArgs) -> Result<String> {
    let energy = EnergyPoint::from_mev(args.energy);
    if !energy.is_finite() {
        return Err(CliError::Argument(format!(
            "energy must be a finite number, got {}",
            args.energy
        )));
    }

    let placeholder = args
        .placeholder
        .clone()
        .unwrap_or_else(|| DefaultsConfig::default().placeholder);
    let template = match &args.template {
        Some(path) => {
            info!("Rendering template {:?}", path);
            MacroTemplate::load(path, &placeholder)
        }
        None => MacroTemplate::new(
            TESTEM1_MUON_COPPER.replace(DEFAULT_PLACEHOLDER, &placeholder),
            placeholder.as_str(),
        ),
    }
    .map_err(EngineError::from)?;

    Ok(template.render(energy))
}
