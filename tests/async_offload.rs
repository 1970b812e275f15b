// tests/async_offload.rs
use std::sync::Arc;
use style_fusion::{
    merge_profile, merge_profile_async, merge_profile_with, FusionConfig, MergedProfile, QualitySignals,
    SourceAssessment,
};

fn batch() -> Vec<SourceAssessment> {
    vec![
        SourceAssessment::new("CorrespondenceSource")
            .words(2000)
            .tone("conversational")
            .formality("casual")
            .sentence_length("short")
            .vocabulary(["honestly", "cheers"])
            .avoidance(["emojis"]),
        SourceAssessment::new("RepositorySource")
            .words(1200)
            .tone("professional")
            .formality("balanced")
            .sentence_length("medium")
            .vocabulary(["refactor", "honestly"])
            .avoidance(["emojis", "slang"]),
    ]
}

#[tokio::test]
async fn async_merge_matches_sync_merge() {
    let cfg = Arc::new(FusionConfig::default());
    let signals = QualitySignals::advanced();
    let sync = merge_profile_with(&batch(), &signals, &cfg);
    let offloaded = merge_profile_async(batch(), signals, cfg).await;
    assert_eq!(offloaded, sync);
    assert_eq!(offloaded.sources_used, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_merges_do_not_interfere() {
    let cfg = Arc::new(FusionConfig {
        parallel_mergers: true,
        ..FusionConfig::default()
    });
    let expected = merge_profile(&batch());

    let handles: Vec<_> = (0..8)
        .map(|_| tokio::spawn(merge_profile_async(batch(), QualitySignals::default(), cfg.clone())))
        .collect();
    for h in handles {
        assert_eq!(h.await.unwrap(), expected);
    }
}

#[tokio::test]
async fn empty_async_batch_is_degraded() {
    let p = merge_profile_async(Vec::new(), QualitySignals::default(), Arc::new(FusionConfig::default())).await;
    assert_eq!(p, MergedProfile::default());
}
