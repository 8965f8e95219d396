#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = agritrace_cli::log_format_from_env();
    agritrace_observability::init_with(format);

    let item_code = agritrace_cli::item_code_arg(std::env::args().skip(1))?;

    let report = agritrace_cli::trace(&item_code).await.inspect_err(|e| {
        tracing::error!(error = %e, "provenance lookup failed");
    })?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
