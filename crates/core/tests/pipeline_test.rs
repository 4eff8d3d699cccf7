//! End-to-end close pipeline tests.
//!
//! Every test lays out a small close folder structure in a temp dir and
//! drives the built-in steps through the runner with the CSV backend, so
//! `.xlsx` names hold CSV text.

#![allow(clippy::too_many_lines)]

use std::path::Path;

use serde_json::{Value, json};

use closeflow_core::pipeline::{AUDIT_LOG_FILE, PipelineError, Runner};
use closeflow_core::schema::{Schema, TB_COLUMNS};
use closeflow_core::{StepStatus, TableStore};
use closeflow_shared::PipelineConfig;

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn seed_close_folder(root: &Path, rates: &str) {
    write(
        &root.join("tb/TB_US_202501.xlsx"),
        "EntityCode,AccountCode,AccountName,Debit,Credit,Period,CurrencyCode\n\
         US,1000,Cash,100,0,202501,USD\n\
         US,2000,Payables,0,100,202501,USD\n",
    );
    write(
        &root.join("tb/TB_GB_202501.xlsx"),
        "Entity,Account,AccountDesc,Dr,Cr,Currency\n\
         GB,1100,Receivable,80,0,gbp\n\
         GB,4000,Sales,,80,gbp\n",
    );
    write(&root.join("tb/TB_US_202412.xlsx"), "not,for,this,period\n");
    write(&root.join("fx/FX_Rates_202501.xlsx"), rates);
}

fn base_config(root: &Path) -> PipelineConfig {
    let folder = |name: &str| root.join(name).to_string_lossy().into_owned();
    PipelineConfig::new("202501")
        .with_folder("tb", folder("tb"))
        .with_folder("fx", folder("fx"))
        .with_folder("support", folder("support"))
        .with_folder("logs", folder("logs"))
}

fn collector_params() -> Value {
    json!({ "required_columns": TB_COLUMNS })
}

fn runner() -> Runner {
    Runner::with_builtin_steps(TableStore::delimited())
}

#[test]
fn test_close_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    seed_close_folder(root, "Currency,Rate\nUSD,1\nGBP,1.28\n");

    let config = base_config(root)
        .with_step("TBCollector", collector_params())
        .with_step("FXTranslator", json!({ "tolerance": 5 }))
        .with_step(
            "PDFAssembler",
            json!({ "include": ["{tb}/Master_TB_{period}_Adjusted.xlsx", "{fx}/FX_Adjustments_{period}.xlsx"] }),
        );

    let logs = runner().run(&config).unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|log| log.status == StepStatus::Ok), "{logs:?}");
    assert_eq!(logs[0].messages, vec!["Master TB rows=4 files=2"]);
    assert_eq!(logs[0].metrics["files"], 2);
    assert_eq!(logs[1].messages, vec!["Applied FX to 4 rows"]);
    assert!(logs[2].output_hashes.contains_key("support"));

    let store = TableStore::delimited();
    let master = store.read(root.join("tb/Master_TB_202501.xlsx")).unwrap();
    assert_eq!(master.columns(), TB_COLUMNS);
    assert_eq!(master.value(0, "EntityCode"), Some("GB"));
    assert_eq!(master.value(0, "Period"), Some("202501"));
    assert_eq!(master.value(0, "CurrencyCode"), Some("GBP"));
    assert_eq!(master.value(1, "Debit"), Some("0"));

    let adjustments = store.read(root.join("fx/FX_Adjustments_202501.xlsx")).unwrap();
    assert_eq!(adjustments.columns(), Schema::FxAdjustments.columns());
    let reporting: Vec<&str> = adjustments
        .column_values("ReportingCurrencyAmount")
        .unwrap()
        .collect();
    assert_eq!(reporting, ["102.40", "-102.40", "100.00", "-100.00"]);

    let support = std::fs::read_to_string(root.join("support/Support_202501.pdf")).unwrap();
    assert!(support.starts_with("GB | 1100 | Receivable | 80 | 0 | 202501 | GBP | 1.28 | 80 | 102.40\n"));

    let audit = store.read(root.join("logs").join(AUDIT_LOG_FILE)).unwrap();
    assert_eq!(audit.len(), 3);
    assert_eq!(audit.value(2, "StepName"), Some("PDFAssembler"));
}

#[test]
fn test_master_tb_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    seed_close_folder(root, "CurrencyCode,FXRate\nUSD,1\n");

    let config = base_config(root).with_step("TBCollector", collector_params());
    let master = root.join("tb/Master_TB_202501.xlsx");

    let first_logs = runner().run(&config).unwrap();
    let first = std::fs::read(&master).unwrap();
    let second_logs = runner().run(&config).unwrap();
    let second = std::fs::read(&master).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_logs[0].output_hashes, second_logs[0].output_hashes);
}

#[test]
fn test_missing_rate_halts_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    seed_close_folder(root, "CurrencyCode,FXRate\nUSD,1\n");

    let config = base_config(root)
        .with_step("TBCollector", collector_params())
        .with_step("FXTranslator", Value::Null)
        .with_step("PDFAssembler", json!({ "include": ["{tb}/Master_TB_{period}.xlsx"] }));

    let logs = runner().run(&config).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].status, StepStatus::Error);
    assert_eq!(logs[1].messages, vec!["Missing FX rates for: [\"GBP\"]"]);
    assert!(!root.join("tb/Master_TB_202501_Adjusted.xlsx").exists());
    assert!(!root.join("support/Support_202501.pdf").exists());

    let audit = TableStore::delimited()
        .read(root.join("logs").join(AUDIT_LOG_FILE))
        .unwrap();
    assert_eq!(audit.value(1, "Status"), Some("error"));
}

#[test]
fn test_unbalanced_file_fails_collection() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    seed_close_folder(root, "CurrencyCode,FXRate\nUSD,1\n");
    write(
        &root.join("tb/TB_FR_202501.xlsx"),
        "EntityCode,AccountCode,AccountName,Debit,Credit,CurrencyCode\nFR,1000,Cash,10,9.99,EUR\n",
    );

    let config = base_config(root).with_step("TBCollector", collector_params());
    let logs = runner().run(&config).unwrap();
    assert_eq!(logs[0].status, StepStatus::Error);
    assert_eq!(logs[0].messages, vec!["TB_FR_202501.xlsx: debits != credits"]);
}

#[test]
fn test_unknown_step_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(dir.path()).with_step("Reconciler", Value::Null);

    let err = runner().run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::UnknownStep { ref name, .. } if name == "Reconciler"));
}

#[test]
fn test_engagement_letters_from_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("clients/metadata.json"),
        r#"[
            {"ClientName": "Acme Corp", "ClientID": "C1", "ServiceLines": "AUD;TAX"},
            {"ClientName": "Beta LLC", "ClientID": "C2", "ServiceLines": "AUD"}
        ]"#,
    );
    write(
        &root.join("clients/service_lines.csv"),
        "Code,Description,BillingRate\nAUD,Audit,1500\nTAX,Tax,$250\n",
    );
    write(
        &root.join("clients/template.txt"),
        "Dear {{ClientName}},\n{{ServiceSummary}}\nFY{{FiscalYear}}\n",
    );
    write(
        &root.join("clients/prior/Acme_Corp_EngagementLetter_FY2024.docx"),
        "Acme terms carried over.",
    );

    let config_path = root.join("close.yaml");
    write(
        &config_path,
        &format!(
            r#"
period: "202501"
folders:
  clients: "{clients}"
  support: "{support}"
pipeline:
  - step: ClientEngagementLetterDraft
    params:
      client_metadata: "{{clients}}/metadata.json"
      service_lines: "{{clients}}/service_lines.csv"
      template_path: "{{clients}}/template.txt"
      prior_letters_folder: "{{clients}}/prior"
      notification_recipients: "manager@firm.test"
"#,
            clients = root.join("clients").display(),
            support = root.join("support").display(),
        ),
    );

    let config = PipelineConfig::load(&config_path).unwrap();
    let logs = runner().run(&config).unwrap();
    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.status, StepStatus::Ok, "{:?}", log.messages);
    assert_eq!(log.metrics["letters_generated"], 2);
    assert_eq!(log.metrics["rolled_forward_letters"], 1);
    assert_eq!(log.metrics["notifications_prepared"], 2);
    assert_eq!(
        log.messages,
        vec![
            "Prior year letter not found for Beta LLC FY2025 → defaulted to template.",
            "Generated 2 engagement letter drafts.",
        ]
    );

    let letters = root.join("support/EngagementLetters/202501");
    let acme = std::fs::read_to_string(letters.join("Acme_Corp_EngagementLetter_FY2025.docx")).unwrap();
    assert!(acme.starts_with("Acme terms carried over.\n\nService Summary:\n- AUD (Audit) @ $1,500.00\n- TAX (Tax) @ $250.00"));
    let beta = std::fs::read_to_string(letters.join("Beta_LLC_EngagementLetter_FY2025.docx")).unwrap();
    assert_eq!(beta, "Dear Beta LLC,\n- AUD (Audit) @ $1,500.00\nFY2025\n");

    let manifest: Value =
        serde_json::from_str(&std::fs::read_to_string(letters.join("draft_manifest_202501.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["letters"][0]["source"], "rolled_forward");
    assert_eq!(manifest["letters"][1]["source"], "template");
    assert!(log.input_hashes.contains_key("template_path"));
}
