use crate::utils;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tenantflow_cloud::{Engine, Provisioner, StateManager};
use tenantflow_cloud_gcp::{GcpConfig, GcpProvider};
use tenantflow_cloud_gitlab::GitLabProvider;

pub async fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "プロビジョニングを開始します...".blue().bold());

    let manifest_path = utils::resolve_manifest_path(config)?;
    let (_, deployment) = utils::load_deployment(&manifest_path)?;

    let state_manager = StateManager::new(utils::project_root(&manifest_path));
    let lock = state_manager.acquire_lock().await?;
    let mut state = state_manager.load().await?;

    let adopted = deployment.adopt_aliases(&mut state);
    utils::print_adopted(&adopted);
    let plan = deployment.plan_with_state(&state)?;
    utils::print_plan(&plan);

    if !plan.has_changes {
        if !adopted.is_empty() {
            state_manager
                .save(&state)
                .await
                .context("状態ファイルの保存に失敗しました")?;
        }
        lock.release().await?;
        println!("{}", "✓ すべてのリソースは作成済みです".green().bold());
        return Ok(());
    }

    let gitlab = GitLabProvider::from_env().context("GitLab の設定が不足しています")?;
    let gcp_config = match GcpConfig::from_env() {
        Ok(config) => config,
        Err(e) if deployment.needs_cloud_infra() => {
            return Err(e).context("Google Cloud の設定が不足しています");
        }
        // クラウドリソースを宣言するユニットがないので呼ばれない
        Err(_) => GcpConfig::new(String::new()),
    };
    let provisioner = Provisioner::new(Arc::new(gitlab), Arc::new(GcpProvider::new(gcp_config)));
    let engine = Engine::new(provisioner);

    println!();
    println!("{}", "認証を確認中...".blue());
    engine.preflight(&deployment).await?;

    let report = engine.apply(&deployment, &mut state).await?;

    state_manager
        .save(&state)
        .await
        .context("状態ファイルの保存に失敗しました")?;
    lock.release().await?;

    utils::print_apply_result(&report.result);

    if !report.is_success() {
        eprintln!();
        eprintln!("{}", "✗ 一部のリソースを作成できませんでした".red().bold());
        for failure in &report.errors {
            eprintln!(
                "  {} {}: {}",
                failure.unit.bold(),
                failure.resource,
                failure.error
            );
        }
        anyhow::bail!("{} 件のユニットが失敗しました", report.errors.len());
    }

    println!("{}", "✓ すべてのリソースを作成しました".green().bold());
    Ok(())
}
