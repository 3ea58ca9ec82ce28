//! ffmpeg `-filter_complex` expression for a fading slideshow.

use slidereel_core::constants::{FADE_SECONDS, OUTPUT_HEIGHT, OUTPUT_PIXEL_FORMAT, OUTPUT_WIDTH};

/// Build the filter graph for `image_count` looped inputs shown for
/// `duration_secs` each.
///
/// Every input `i` is letterboxed into the output frame, faded in at `t=0`
/// and out at `t=duration-1`, and labelled `v{i}`. The labelled streams are
/// concatenated in order into the single output label `v`.
///
/// Callers guarantee `image_count >= 1` and `duration_secs > FADE_SECONDS`.
pub fn build_filter_graph(image_count: usize, duration_secs: f64) -> String {
    let fade_out_start = format_seconds(duration_secs - FADE_SECONDS);
    let mut graph = String::new();

    for i in 0..image_count {
        graph.push_str(&format!(
            "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,\
             fade=t=in:st=0:d={fade},\
             fade=t=out:st={fade_out_start}:d={fade}[v{i}];",
            w = OUTPUT_WIDTH,
            h = OUTPUT_HEIGHT,
            fade = FADE_SECONDS,
        ));
    }

    for i in 0..image_count {
        graph.push_str(&format!("[v{}]", i));
    }

    graph.push_str(&format!(
        "concat=n={}:v=1:a=0,format={}[v]",
        image_count, OUTPUT_PIXEL_FORMAT
    ));

    graph
}

/// Millisecond precision with trailing zeros dropped, so float noise from the
/// subtraction (`1.1 - 1.0`) does not leak into the expression.
fn format_seconds(secs: f64) -> String {
    let fixed = format!("{:.3}", secs);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}
