use crate::utils;
use colored::Colorize;
use std::path::Path;

pub fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "マニフェストを検証中...".blue());

    let manifest_path = utils::resolve_manifest_path(config)?;
    println!(
        "マニフェスト: {}",
        manifest_path.display().to_string().cyan()
    );

    let (manifest, deployment) = utils::load_deployment(&manifest_path)?;

    println!("{}", "✓ マニフェストは正常です！".green().bold());
    println!();
    println!("サマリー:");
    match manifest.namespace {
        Some(namespace) => println!("  GitLab namespace: {}", namespace),
        None => println!("  GitLab namespace: (未設定)"),
    }
    println!("  顧客: {}個", deployment.units().len());
    for unit in deployment.units() {
        let cloud = if unit.needs_cloud_infra() {
            format!(", GCP: {}", unit.ids.token)
        } else {
            String::new()
        };
        println!(
            "    - {} ({}{})",
            unit.name().cyan(),
            unit.ids.slug,
            cloud
        );
    }
    println!("  リソース: {}個", deployment.graph().len());

    Ok(())
}
