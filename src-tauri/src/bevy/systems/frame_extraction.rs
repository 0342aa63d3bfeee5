//! Frame extraction system
//!
//! This module handles extracting rendered frames from the GPU and
//! preparing them for transfer to the Tauri frontend.

use bevy::{prelude::*, time::Time};
use tracing::{debug, warn};

use crate::bevy::plugins::image_copy::padded_bytes_per_row;
use crate::bevy::resources::{
    FrameBufferRes, FrameCount, FrameRateLimiter, FrameTimings, MainWorldReceiver, PerfStatsRes,
    PreRollFrames, RenderedFrame, ViewportSize,
};
use crate::config::performance::*;
use crate::tauri_bridge::shared_state::Frame;

/// Extract and process frame data from the render pipeline
#[allow(clippy::too_many_arguments)]
pub fn extract_and_process_frame(
    receiver: Res<MainWorldReceiver>,
    buffer: Option<Res<FrameBufferRes>>,
    perf_stats: Option<Res<PerfStatsRes>>,
    viewport: Res<ViewportSize>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
    mut timings: ResMut<FrameTimings>,
    mut frame_limiter: ResMut<FrameRateLimiter>,
    time: Res<Time>,
) {
    let Some(b) = buffer else { return };

    // Wait for scene to be fully rendered
    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 % 10 == 0 && pre_roll.0 > 0 {
            debug!(remaining = pre_roll.0, "pre-roll frames remaining");
        }
        return;
    }

    // Frame rate limiting - skip if not enough time has passed
    let now = std::time::Instant::now();
    let elapsed = now.duration_since(frame_limiter.last_frame_time);
    if elapsed < frame_limiter.min_frame_interval {
        // Drain the receiver but don't process - too early for next frame
        while receiver.try_recv().is_ok() {}
        return;
    }
    frame_limiter.last_frame_time = now;

    let frame_start = std::time::Instant::now();

    // Keep only the newest frame rendered at the current size
    let receive_start = std::time::Instant::now();
    let mut latest = None;
    while let Ok(rendered) = receiver.try_recv() {
        if rendered.width == viewport.width && rendered.height == viewport.height {
            latest = Some(rendered);
        }
    }
    let receive_time = receive_start.elapsed().as_secs_f64() * 1000.0;

    let Some(rendered) = latest else { return };

    let process_start = std::time::Instant::now();
    let Some(frame) = remove_row_padding(&rendered) else {
        warn!(
            bytes = rendered.data.len(),
            width = rendered.width,
            height = rendered.height,
            "discarding truncated frame"
        );
        return;
    };
    let process_time = process_start.elapsed().as_secs_f64() * 1000.0;
    let data_size = frame.rgba.len();

    if let Err(err) = b.0.publish(frame) {
        warn!(%err, "failed to publish frame");
        return;
    }
    count.0 += 1;

    let total_time = frame_start.elapsed().as_secs_f64() * 1000.0;
    timings.frame_times.push(total_time);

    // Keep only last N samples for averaging
    if timings.frame_times.len() > FRAME_TIMING_SAMPLES {
        timings.frame_times.remove(0);
    }
    let avg_time = timings.frame_times.iter().sum::<f64>() / timings.frame_times.len() as f64;

    // Update performance stats
    if let Some(perf_res) = &perf_stats {
        let frame_count = count.0;
        let updated = perf_res.0.with(|stats| {
            stats.gpu_transfer_ms = receive_time;
            stats.data_processing_ms = process_time;
            stats.frame_encoding_ms = total_time;
            stats.frame_count = frame_count;
            stats.data_size_kb = data_size as f64 / 1024.0;
            stats.bevy_fps = if avg_time > 0.0 { 1000.0 / avg_time } else { 0.0 };
        });
        if let Err(err) = updated {
            warn!(%err, "failed to update performance stats");
        }
    }

    // Log detailed stats periodically
    let current_time = time.elapsed_secs_f64();
    if current_time - timings.last_print_time >= STATS_PRINT_INTERVAL {
        let max_time = timings.frame_times.iter().cloned().fold(0.0f64, f64::max);
        let min_time = timings.frame_times.iter().cloned().fold(f64::MAX, f64::min);

        debug!(
            frame = count.0,
            receive_ms = format_args!("{receive_time:.2}"),
            process_ms = format_args!("{process_time:.2}"),
            total_ms = format_args!("{total_time:.2}"),
            avg_ms = format_args!("{avg_time:.2}"),
            min_ms = format_args!("{min_time:.2}"),
            max_ms = format_args!("{max_time:.2}"),
            size_kb = format_args!("{:.1}", data_size as f64 / 1024.0),
            "frame stats"
        );
        timings.last_print_time = current_time;
    }
}

/// Remove GPU buffer row padding alignment, returning a packed RGBA frame
pub fn remove_row_padding(rendered: &RenderedFrame) -> Option<Frame> {
    let row_bytes = rendered.width as usize * 4;
    let aligned_row_bytes = padded_bytes_per_row(rendered.width);
    let height = rendered.height as usize;

    if row_bytes == 0 || rendered.data.len() < aligned_row_bytes * (height.max(1) - 1) + row_bytes
    {
        return None;
    }

    let rgba: Vec<u8> = if row_bytes == aligned_row_bytes {
        rendered.data[..row_bytes * height].to_vec()
    } else {
        rendered
            .data
            .chunks(aligned_row_bytes)
            .take(height)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    };

    Frame::new(rendered.width, rendered.height, rgba).ok()
}
