//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `repeater_core` linkage.
//! - Project the stored children of one relation from an on-disk database.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage:
//! - `repeater_cli` prints ping, version and schema version.
//! - `repeater_cli project <db> <config.json> <ParentModel> <parent_id> <relation> [ChildModel]`
//!   prints the projected form fields as JSON.

use repeater_core::db::migrations::latest_version;
use repeater_core::model::naming::model_name_for;
use repeater_core::{
    core_version, open_db, open_db_in_memory, ping, ChildRepositoryRegistry, ChildSchema,
    FormFields, ParentRecord, RepeaterConfig, RepeaterService, SqliteChildRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None => probe(),
        Some("project") => project(&args[1..]),
        Some(other) => Err(format!("unknown command `{other}`").into()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("repeater_cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn probe() -> Result<(), Box<dyn Error>> {
    println!("repeater_core ping={}", ping());
    println!("repeater_core version={}", core_version());
    open_db_in_memory()?;
    println!("repeater_core schema_version={}", latest_version());
    Ok(())
}

fn project(args: &[String]) -> Result<(), Box<dyn Error>> {
    let [db_path, config_path, parent_model, parent_id, relation, rest @ ..] = args else {
        return Err(
            "usage: project <db> <config.json> <ParentModel> <parent_id> <relation> [ChildModel]"
                .into(),
        );
    };
    let parent = ParentRecord::new(parent_id.parse()?, parent_model);
    let child_model = rest
        .first()
        .cloned()
        .unwrap_or_else(|| model_name_for(relation));

    let conn = open_db(db_path)?;
    let config = RepeaterConfig::load(config_path)?;
    let repository = SqliteChildRepository::try_new(
        &conn,
        ChildSchema::new(child_model).with_foreign_key(parent.foreign_key.clone()),
    )?;
    let registry = ChildRepositoryRegistry::new().with(relation, repository)?;
    let service = RepeaterService::new(registry, Vec::new(), config);

    let fields = service.form_fields_for_repeater(
        &parent,
        FormFields::default(),
        relation,
        None,
        None,
    )?;
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}
