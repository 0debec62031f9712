use anyhow::Context;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tenantflow_cloud::{ActionType, ApplyResult, Deployment, Plan};
use tenantflow_core::Manifest;

/// マニフェストの場所を決定
pub fn resolve_manifest_path(config: Option<&Path>) -> anyhow::Result<PathBuf> {
    match config {
        Some(path) => Ok(path.to_path_buf()),
        None => tenantflow_config::find_manifest_file()
            .context("マニフェストファイルが見つかりません"),
    }
}

/// 状態ファイルを置くディレクトリ（マニフェストと同じ場所）
pub fn project_root(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// マニフェストを読み込み、デプロイメントを構築
pub fn load_deployment(manifest_path: &Path) -> anyhow::Result<(Manifest, Deployment)> {
    let manifest = tenantflow_core::load_manifest_from_path(manifest_path).with_context(|| {
        format!(
            "マニフェストの読み込みに失敗しました: {}",
            manifest_path.display()
        )
    })?;
    let deployment =
        Deployment::from_manifest(&manifest).context("ユニットの検証に失敗しました")?;
    Ok((manifest, deployment))
}

/// 別名から引き継いだ状態エントリを表示
pub fn print_adopted(adopted: &[(String, String)]) {
    for (alias, key) in adopted {
        println!("  {} {} -> {}", "↻".cyan(), alias.dimmed(), key.cyan());
    }
}

pub fn print_plan(plan: &Plan) {
    if plan.actions.is_empty() {
        println!("{}", "作成するリソースはありません".dimmed());
        return;
    }

    let mut current_unit: Option<&str> = None;
    for action in &plan.actions {
        if current_unit != Some(action.unit.as_str()) {
            println!();
            println!("{}", action.unit.bold());
            current_unit = Some(action.unit.as_str());
        }

        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Upsert => "~".yellow(),
            ActionType::NoOp => "=".dimmed(),
        };
        println!(
            "  {} {} {}",
            marker,
            action.resource_key.cyan(),
            action.description.dimmed()
        );
    }

    println!();
    println!("Plan: {}", plan.summary().to_string().bold());
}

pub fn print_apply_result(result: &ApplyResult) {
    println!();
    for item in &result.succeeded {
        println!("  {} {}", "✓".green(), item.action_id);
    }
    for item in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            item.action_id,
            item.error.as_deref().unwrap_or("")
        );
    }
    for item in &result.unchanged {
        println!("  {} {}", "=".dimmed(), item.action_id.dimmed());
    }
    for item in &result.skipped {
        println!(
            "  {} {} ({})",
            "-".yellow(),
            item.action_id.dimmed(),
            item.message
        );
    }

    println!();
    println!(
        "{} 件成功, {} 件変更なし, {} 件失敗, {} 件スキップ ({} ms)",
        result.succeeded.len(),
        result.unchanged.len(),
        result.failed.len(),
        result.skipped.len(),
        result.duration_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root_of_relative_file() {
        assert_eq!(project_root(Path::new("tenantflow.kdl")), PathBuf::from("."));
        assert_eq!(
            project_root(Path::new("/srv/customers/tenantflow.kdl")),
            PathBuf::from("/srv/customers")
        );
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let path = resolve_manifest_path(Some(Path::new("custom.kdl"))).unwrap();
        assert_eq!(path, PathBuf::from("custom.kdl"));
    }
}
