use anyhow::anyhow;
use tokio::io::AsyncWriteExt;
use tracing::info;
use vclgen_core::{
    BranchNumbering, DirectoryTemplateLocator, Interpolation, TranspileOptions, VclGenerator,
};

use crate::cli::GenerateArgs;
use crate::context::{CliError, CliResult, load_settings};

pub(crate) async fn handle_generate(args: GenerateArgs) -> CliResult<()> {
    let store = load_settings(&args.source.settings, args.source.store.as_deref()).await?;
    let generator = VclGenerator::new(store, DirectoryTemplateLocator::new(&args.template_dir))
        .with_options(transpile_options(&args));

    let vcl = generator.generate(args.varnish_version, args.input_file.as_deref())?;

    if let Some(path) = &args.output {
        tokio::fs::write(path, vcl.as_bytes())
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to write {}: {err}", path.display())))?;
        info!(path = %path.display(), "wrote vcl");
    } else {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(vcl.as_bytes())
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to write VCL to stdout: {err}")))?;
        stdout
            .flush()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to flush stdout: {err}")))?;
    }
    Ok(())
}

const fn transpile_options(args: &GenerateArgs) -> TranspileOptions {
    TranspileOptions {
        numbering: if args.repair_branch_chain {
            BranchNumbering::Emitted
        } else {
            BranchNumbering::SourceIndex
        },
        interpolation: if args.escape_strings {
            Interpolation::Escaped
        } else {
            Interpolation::Verbatim
        },
    }
}
