//! Scan tests: every address once per frame, in order

use super::*;

/// Enabled scan addresses, split at each compute-domain frame pulse
fn frames_of_addresses(signals: &[ComputeSignals]) -> Vec<Vec<usize>> {
    let mut frames: Vec<Vec<usize>> = Vec::new();
    for s in signals {
        if s.frame {
            frames.push(Vec::new());
        }
        if s.scan.enable {
            frames
                .last_mut()
                .expect("no addresses are issued before the first frame")
                .push(s.scan.address);
        }
    }
    frames
}

#[test]
fn test_one_frame_scans_every_address_once() {
    let mut rig = Rig::new(small_framebuffer(1), 2);
    for _ in 0..3 {
        rig.run_frame();
    }

    let frames = frames_of_addresses(&rig.compute);
    assert_eq!(frames.len(), 3);
    for addresses in &frames {
        assert_eq!(addresses, &(0..8).collect::<Vec<_>>());
    }
}

#[test]
fn test_scaled_display_still_scans_once() {
    let mut rig = Rig::new(small_framebuffer(2), 1);
    for _ in 0..2 {
        rig.run_frame();
    }

    let frames = frames_of_addresses(&rig.compute);
    assert_eq!(frames.len(), 2);
    for addresses in &frames {
        assert_eq!(addresses, &(0..8).collect::<Vec<_>>());
    }
}

#[test]
fn test_frame_reaches_core_before_first_request() {
    let mut rig = Rig::new(small_framebuffer(1), 2);
    rig.run_frame();

    let frame = rig.compute.iter().position(|s| s.frame);
    let request = rig.compute.iter().position(|s| s.data_request);
    assert_eq!(request, frame.map(|f| f + 1));
    assert_eq!(frame, Some(rig.fb.frame_latency() - 1));
}

#[test]
fn test_one_request_per_displayed_source_line() {
    let mut rig = Rig::new(small_framebuffer(2), 2);
    rig.run_frame();

    // The frame request plus one per bank swap; the last asks past the end
    let requests = rig.compute.iter().filter(|s| s.data_request).count();
    assert_eq!(requests, 3);
}
