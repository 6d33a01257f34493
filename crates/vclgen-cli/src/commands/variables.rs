use vclgen_core::{GeneratorError, VariableBuilder};

use crate::cli::VariablesArgs;
use crate::context::{CliResult, load_settings};
use crate::output::render_variables;

pub(crate) async fn handle_variables(args: VariablesArgs) -> CliResult<()> {
    let store = load_settings(&args.source.settings, args.source.store.as_deref()).await?;
    let variables = VariableBuilder::new(&store)
        .build()
        .map_err(|source| GeneratorError::Config {
            operation: "cli.variables",
            source,
        })?;
    render_variables(&variables.to_map(), args.format)
}
