//! End-to-end pipeline runs against a scripted LLM
//!
//! Each test builds a throwaway repository, queues extraction, plan and
//! review responses, and checks the report, persisted state and memory.

mod support;

use logicmapper::embeddings::HashingEmbedder;
use logicmapper::llm::{BackendError, MockLLMClient, MockResponse};
use logicmapper::memory::SemanticMemoryStore;
use logicmapper::pipeline::{
    FileStatus, Orchestrator, PipelineConfig, PipelineContext, PipelineState, PipelineStatus,
};
use logicmapper::search::{MockWebSearch, SearchHit};
use std::path::Path;
use std::sync::Arc;
use support::{write_repo, CapturingHandler};
use tempfile::TempDir;

const VIP_BILLING: &str = r#"# Billing rules
def apply_discount(customer, total):
    # VIPs get a better deal
    if customer.is_vip:
        return total * 0.8
    return total
"#;

fn config_in(out: &Path) -> PipelineConfig {
    PipelineConfig::default()
        .with_state_file(Some(out.join("project_state.json")))
        .with_report_file(Some(out.join("final_report.md")))
}

fn context_with(
    llm: Arc<MockLLMClient>,
    memory_dir: &Path,
    out: &Path,
    progress: Arc<CapturingHandler>,
) -> PipelineContext {
    let memory =
        SemanticMemoryStore::open(memory_dir, Arc::new(HashingEmbedder::default())).unwrap();
    PipelineContext::offline(llm, config_in(out))
        .with_progress(progress)
        .with_memory(Arc::new(memory))
}

fn queue_run(llm: &MockLLMClient, rules: &str) {
    llm.add_response(MockResponse::text(rules));
    llm.add_response(MockResponse::text(
        "# Modernization Plan\n\n## Core Domain\n- Pricing service owns VIP discounts",
    ));
    llm.add_response(MockResponse::text("Pass: every rule is covered"));
}

#[tokio::test]
async fn test_vip_discount_report() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let memory_dir = TempDir::new().unwrap();
    write_repo(repo.path(), &[("billing.py", VIP_BILLING)]);

    let llm = Arc::new(MockLLMClient::new());
    queue_run(&llm, "- VIP customers receive a 20% discount on the order total");

    let progress = Arc::new(CapturingHandler::default());
    let orchestrator = Orchestrator::new(context_with(
        llm.clone(),
        memory_dir.path(),
        out.path(),
        progress,
    ));
    let outcome = orchestrator
        .run(&repo.path().to_string_lossy())
        .await
        .unwrap();

    assert_eq!(outcome.state.scanned_files, vec!["billing.py".to_string()]);
    assert_eq!(outcome.extraction.rules.len(), 1);
    assert!(outcome.extraction.rules[0].contains("discount"));
    assert!(outcome.report.starts_with("# Modernization Plan"));
    assert!(outcome.report.contains("# QA Review"));
    assert!(outcome.report.ends_with("Pass: every rule is covered"));
    assert_eq!(llm.remaining_responses(), 0);

    let prompts = llm.prompts();
    assert!(prompts[0].contains("billing.py"));
    assert!(!prompts[0].contains("VIPs get a better deal"));
    assert!(prompts[1].contains("VIP customers receive a 20% discount"));

    let report = std::fs::read_to_string(out.path().join("final_report.md")).unwrap();
    assert_eq!(report, outcome.report);

    let state = PipelineState::load(&out.path().join("project_state.json"))
        .unwrap()
        .unwrap();
    assert_eq!(state.status(), PipelineStatus::Complete);
    assert_eq!(state.analyses["billing.py"].status, FileStatus::Analyzed);
    assert_eq!(state.analyses["billing.py"].rules.len(), 1);
}

#[tokio::test]
async fn test_memory_is_recalled_across_runs() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let memory_dir = TempDir::new().unwrap();
    write_repo(repo.path(), &[("billing.py", VIP_BILLING)]);

    let first_progress = Arc::new(CapturingHandler::default());
    let llm = Arc::new(MockLLMClient::new());
    queue_run(&llm, "VIP customers receive a 20% discount");
    Orchestrator::new(context_with(
        llm,
        memory_dir.path(),
        out.path(),
        first_progress.clone(),
    ))
    .run(&repo.path().to_string_lossy())
    .await
    .unwrap();

    let second_progress = Arc::new(CapturingHandler::default());
    let llm = Arc::new(MockLLMClient::new());
    queue_run(&llm, "VIP customers receive a 20% discount");
    Orchestrator::new(context_with(
        llm.clone(),
        memory_dir.path(),
        out.path(),
        second_progress.clone(),
    ))
    .run(&repo.path().to_string_lossy())
    .await
    .unwrap();

    assert_eq!(first_progress.recall_counts(), vec![0]);
    assert_eq!(second_progress.recall_counts(), vec![1]);
    assert!(llm.prompts()[0].contains("Relevant Business Rules from Memory Bank"));
}

#[tokio::test]
async fn test_failed_file_does_not_stop_the_run() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let memory_dir = TempDir::new().unwrap();
    write_repo(
        repo.path(),
        &[
            ("a_tax.py", "TAX = 0.05\n"),
            ("b_shipping.js", "const FREE_SHIPPING = 500;\n"),
            ("notes.txt", "ignored"),
        ],
    );

    let llm = Arc::new(MockLLMClient::new());
    llm.add_response(MockResponse::error(BackendError::TimeoutError { seconds: 1 }));
    queue_run(&llm, "Orders over $500 ship for free");

    let outcome = Orchestrator::new(context_with(
        llm,
        memory_dir.path(),
        out.path(),
        Arc::new(CapturingHandler::default()),
    ))
    .run(&repo.path().to_string_lossy())
    .await
    .unwrap();

    assert_eq!(outcome.state.scanned_files.len(), 2);
    assert_eq!(outcome.state.analyses["a_tax.py"].status, FileStatus::Error);
    assert_eq!(
        outcome.state.analyses["b_shipping.js"].status,
        FileStatus::Analyzed
    );
    assert_eq!(
        outcome.extraction.rules,
        vec!["Orders over $500 ship for free".to_string()]
    );
}

#[tokio::test]
async fn test_search_context_reaches_prompt() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let memory_dir = TempDir::new().unwrap();
    write_repo(
        repo.path(),
        &[(
            "pricing.py",
            "import stripe\n\ndef charge(total):\n    return stripe.Charge.create(amount=total)\n",
        )],
    );

    let llm = Arc::new(MockLLMClient::new());
    queue_run(&llm, "Charges are created for the full order total");
    let search = Arc::new(MockWebSearch::with_hits(vec![SearchHit::new(
        "Stripe API",
        "https://stripe.com/docs",
        "Online payment processing",
    )]));

    let context = context_with(
        llm.clone(),
        memory_dir.path(),
        out.path(),
        Arc::new(CapturingHandler::default()),
    )
    .with_search(search.clone());
    Orchestrator::new(context)
        .run(&repo.path().to_string_lossy())
        .await
        .unwrap();

    assert_eq!(search.queries().len(), 1);
    assert!(search.queries()[0].starts_with("stripe"));
    assert!(llm.prompts()[0].contains("Stripe API: Online payment processing"));
}
