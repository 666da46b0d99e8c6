use std::io::{Read, Write};

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use serde_json::{json, Value};
use vdr_driver::Driver;
use vdr_proxy::{Vdr, VdrProxy};
use vdr_types::encoding::encode_base64url;
use vdr_types::reserved::{DRIVER_FAMILY, DRIVER_IDENTIFIER, MUTABLE};
use vdr_types::{Options, Proof};

use crate::cli::*;
use crate::config::RegistryConfig;

/// Run one subcommand, writing its report to `out`.
pub fn run_command(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = RegistryConfig::load(cli.config.as_deref())?;
    let vdr = config.build_proxy()?;
    let format = cli.format;

    match cli.command {
        Command::Create(args) => cmd_create(&vdr, args, format, out),
        Command::Read(args) => cmd_read(&vdr, args, format, out),
        Command::Update(args) => cmd_update(&vdr, args, format, out),
        Command::Delete(args) => cmd_delete(&vdr, args, format, out),
        Command::Verify(args) => cmd_verify(&vdr, args, format, out),
        Command::Drivers => cmd_drivers(&vdr, format, out),
    }
}

fn cmd_create(
    vdr: &VdrProxy,
    args: CreateArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let data = read_payload(&args.payload)?;
    let mut options = parse_options(&args.options)?;
    if let Some(id) = args.driver_id {
        options.insert(DRIVER_IDENTIFIER.into(), Value::String(id));
    }
    if let Some(family) = args.family {
        options.insert(DRIVER_FAMILY.into(), Value::String(family));
    }
    if args.mutable {
        options.insert(MUTABLE.into(), Value::Bool(true));
    }

    let locator = vdr.create(&data, &options)?;
    match format {
        OutputFormat::Text => {
            writeln!(out, "{} Stored {} bytes", "✓".green().bold(), data.len())?;
            writeln!(out, "  Locator: {}", locator.cyan())?;
        }
        OutputFormat::Json => print_json(out, &json!({ "locator": locator }))?,
    }
    Ok(())
}

fn cmd_read(
    vdr: &VdrProxy,
    args: ReadArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let data = vdr.read(&args.locator)?;
    if let Some(path) = &args.output {
        std::fs::write(path, &data).with_context(|| format!("writing {}", path.display()))?;
        if format == OutputFormat::Text {
            writeln!(
                out,
                "{} Wrote {} bytes to {}",
                "✓".green().bold(),
                data.len(),
                path.display()
            )?;
        }
        return Ok(());
    }
    match format {
        OutputFormat::Text => out.write_all(&data)?,
        OutputFormat::Json => print_json(out, &json!({ "data": encode_base64url(&data) }))?,
    }
    Ok(())
}

fn cmd_update(
    vdr: &VdrProxy,
    args: UpdateArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let data = read_payload(&args.payload)?;
    let options = parse_options(&args.options)?;
    let moved = vdr.update(&data, &args.locator, &options)?;
    match format {
        OutputFormat::Text => {
            writeln!(out, "{} Updated {} bytes", "✓".green().bold(), data.len())?;
            match &moved {
                Some(locator) => writeln!(out, "  New locator: {}", locator.cyan())?,
                None => writeln!(out, "  Locator unchanged")?,
            }
        }
        OutputFormat::Json => print_json(out, &json!({ "locator": moved }))?,
    }
    Ok(())
}

fn cmd_delete(
    vdr: &VdrProxy,
    args: DeleteArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let options = parse_options(&args.options)?;
    vdr.delete(&args.locator, &options)?;
    match format {
        OutputFormat::Text => {
            writeln!(out, "{} Deleted {}", "✓".green().bold(), args.locator.yellow())?
        }
        OutputFormat::Json => print_json(out, &json!({ "deleted": args.locator }))?,
    }
    Ok(())
}

/// Proof with binary fields as base64url text.
#[derive(Serialize)]
struct ProofView {
    #[serde(rename = "type")]
    kind: String,
    proof: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl From<&Proof> for ProofView {
    fn from(proof: &Proof) -> Self {
        Self {
            kind: proof.kind.clone(),
            proof: encode_base64url(&proof.proof),
            data: proof.data.as_deref().map(encode_base64url),
        }
    }
}

fn cmd_verify(
    vdr: &VdrProxy,
    args: VerifyArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let proof = vdr.verify(&args.locator, args.with_data)?;
    let view = ProofView::from(&proof);
    match format {
        OutputFormat::Text => {
            writeln!(out, "{} Proof for {}", "✓".green().bold(), args.locator.yellow())?;
            writeln!(out, "  Type: {}", view.kind.cyan())?;
            writeln!(out, "  Proof: {}", view.proof)?;
            if let Some(data) = &proof.data {
                writeln!(out, "  Data: {}", String::from_utf8_lossy(data))?;
            }
        }
        OutputFormat::Json => print_json(out, &view)?,
    }
    Ok(())
}

fn cmd_drivers(vdr: &VdrProxy, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let descriptors: Vec<_> = vdr.drivers().iter().map(|d| d.descriptor()).collect();
    match format {
        OutputFormat::Text => {
            writeln!(
                out,
                "Registry {} {} ({})",
                vdr.identifier().bold(),
                vdr.version(),
                vdr.url_manager().kind()
            )?;
            for d in &descriptors {
                writeln!(
                    out,
                    "  {} {} v{} (supports {})",
                    d.identifier.yellow(),
                    d.family.cyan(),
                    d.version,
                    d.supported_versions.join(", ")
                )?;
            }
        }
        OutputFormat::Json => print_json(out, &descriptors)?,
    }
    Ok(())
}

fn print_json(out: &mut dyn Write, value: &impl Serialize) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn read_payload(args: &PayloadArgs) -> anyhow::Result<Vec<u8>> {
    if let Some(text) = &args.data {
        return Ok(text.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return std::fs::read(path).with_context(|| format!("reading {}", path.display()));
    }
    let mut data = Vec::new();
    std::io::stdin()
        .read_to_end(&mut data)
        .context("reading payload from stdin")?;
    Ok(data)
}

/// Parse repeated `key=value` flags into driver options.
fn parse_options(pairs: &[String]) -> anyhow::Result<Options> {
    let mut options = Options::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("option {pair:?} is not in key=value form");
        };
        if key.trim().is_empty() {
            bail!("option {pair:?} has an empty key");
        }
        options.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    /// One `vdr` invocation, returning its parsed JSON report.
    fn run_json(config: &Path, args: &[&str]) -> Value {
        let config = config.to_str().unwrap();
        let argv = ["vdr", "--format", "json", "-c", config]
            .into_iter()
            .chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        run_command(cli, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    fn registry(dir: &Path) -> std::path::PathBuf {
        let root = dir.display();
        let path = dir.join("vdr.toml");
        std::fs::write(
            &path,
            format!(
                "[[drivers]]\nkind = \"sqlite\"\nidentifier = \"sql\"\nversion = \"1.0\"\n\
                 path = \"{root}/registry.db\"\n\n\
                 [[drivers]]\nkind = \"ledger\"\nidentifier = \"chain\"\nversion = \"1.0\"\n\
                 path = \"{root}/chain\"\n"
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn locator_from_one_run_reads_in_the_next() {
        let dir = tempfile::tempdir().unwrap();
        let config = registry(dir.path());

        let created = run_json(&config, &["create", "hello"]);
        let locator = created["locator"].as_str().unwrap().to_string();
        assert!(locator.contains("drid=sql"), "{locator}");

        let read = run_json(&config, &["read", &locator]);
        assert_eq!(read["data"], encode_base64url(b"hello"));
    }

    #[test]
    fn ledger_proof_verifies_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = registry(dir.path());

        let created = run_json(&config, &["create", "anchored", "--driver-id", "chain"]);
        let locator = created["locator"].as_str().unwrap().to_string();
        assert!(locator.contains("drid=chain"), "{locator}");

        let first = run_json(&config, &["verify", &locator, "--with-data"]);
        let second = run_json(&config, &["verify", &locator, "--with-data"]);
        assert_eq!(first["data"], encode_base64url(b"anchored"));
        assert_eq!(first, second);
    }

    #[test]
    fn deletion_is_seen_by_later_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = registry(dir.path());

        let created = run_json(&config, &["create", "short-lived"]);
        let locator = created["locator"].as_str().unwrap().to_string();
        let deleted = run_json(&config, &["delete", &locator]);
        assert_eq!(deleted["deleted"], locator.as_str());

        let argv = ["vdr", "-c", config.to_str().unwrap(), "read", locator.as_str()];
        let cli = Cli::try_parse_from(argv).unwrap();
        assert!(run_command(cli, &mut Vec::new()).is_err());
    }

    #[test]
    fn options_parse_key_value_pairs() {
        let options = parse_options(&["ttl=3".into(), "note=a=b".into()]).unwrap();
        assert_eq!(options.get("ttl"), Some(&json!("3")));
        assert_eq!(options.get("note"), Some(&json!("a=b")));
    }

    #[test]
    fn options_reject_malformed_pairs() {
        assert!(parse_options(&["novalue".into()]).is_err());
        assert!(parse_options(&["=x".into()]).is_err());
    }

    #[test]
    fn payload_prefers_inline_data() {
        let args = PayloadArgs {
            data: Some("hi".into()),
            file: None,
        };
        assert_eq!(read_payload(&args).unwrap(), b"hi");
    }

    #[test]
    fn payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.bin");
        std::fs::write(&path, [0u8, 159, 146, 150]).unwrap();
        let args = PayloadArgs {
            data: None,
            file: Some(path),
        };
        assert_eq!(read_payload(&args).unwrap(), vec![0u8, 159, 146, 150]);
    }

    #[test]
    fn proof_view_encodes_binary_fields() {
        let proof = Proof::new(Proof::SHA256, vec![0xfb, 0xff]).with_data(b"x".to_vec(), true);
        let view = ProofView::from(&proof);
        assert_eq!(view.proof, "-_8");
        assert_eq!(view.data.as_deref(), Some("eA"));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "SHA256");
    }
}
