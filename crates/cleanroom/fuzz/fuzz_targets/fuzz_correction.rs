//! Fuzz target for detection and correction.
//!
//! Any parsed table goes through detect and correct without panicking,
//! and correcting the corrected table changes nothing.

#![no_main]

use cleanroom::correction::CorrectionEngine;
use cleanroom::{DetectionEngine, Parser, PipelineConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 20_000 {
        return;
    }
    let Ok(dataset) = Parser::new().parse_bytes(data, b',') else {
        return;
    };

    let config = PipelineConfig::default();
    let detection = DetectionEngine::new(&config.vocabularies);
    let correction = CorrectionEngine::new(&config);

    let (annotated, _) = detection.detect(dataset);
    if let Ok((once, _)) = correction.correct(annotated) {
        if let Ok((twice, log)) = correction.correct(once.clone()) {
            assert_eq!(once, twice);
            assert_eq!(log.values_changed, 0);
        }
    }
});
