use crate::utils;
use colored::Colorize;
use std::path::Path;
use tenantflow_cloud::StateManager;

pub async fn handle(config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let manifest_path = utils::resolve_manifest_path(config)?;
    let (_, deployment) = utils::load_deployment(&manifest_path)?;

    // 読み取りのみ。別名の引き継ぎはメモリ上で行い、保存は up に任せる
    let mut state = StateManager::new(utils::project_root(&manifest_path))
        .load()
        .await?;
    let adopted = deployment.adopt_aliases(&mut state);
    let plan = deployment.plan_with_state(&state)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "マニフェスト: {}",
        manifest_path.display().to_string().cyan()
    );
    utils::print_adopted(&adopted);
    utils::print_plan(&plan);
    Ok(())
}
