//! Deploy recipe: init script and service start

use crate::{INIT_SCRIPT_PATH, SERVICE_NAME, files};
use declarative::{ExecutionPlan, FileMode, Owner, ProvisionStep, ServiceAction};
use std::path::PathBuf;

pub fn plan() -> ExecutionPlan {
    let mut plan = ExecutionPlan::new("deploy");
    plan.push(ProvisionStep::InstallFile {
        source: files::PREVIEW_INIT.to_string(),
        path: PathBuf::from(INIT_SCRIPT_PATH),
        mode: FileMode(0o777),
        owner: Owner::root(),
    });
    plan.push(ProvisionStep::EnsureServiceRunning {
        name: SERVICE_NAME.to_string(),
        action: ServiceAction::Start,
    });
    plan
}
