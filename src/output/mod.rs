use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::transcript::{TranscriptResponse, TranscriptResult};
use crate::utils::format_srt_timestamp;

/// Render a response; failures are always rendered as JSON
pub fn render(response: &TranscriptResponse, format: &OutputFormat, pretty: bool) -> Result<String> {
    let content = match (response, format) {
        (TranscriptResponse::Success(result), OutputFormat::Text) => result.full_text.clone(),
        (TranscriptResponse::Success(result), OutputFormat::Srt) => format_as_srt(result),
        _ if pretty => response.to_json_pretty()?,
        _ => response.to_json()?,
    };

    Ok(content)
}

/// Save rendered response to file
pub async fn save_to_file(
    response: &TranscriptResponse,
    path: &Path,
    format: &OutputFormat,
    pretty: bool,
) -> Result<()> {
    let content = render(response, format, pretty)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print rendered response to stdout
pub fn print_to_console(response: &TranscriptResponse, format: &OutputFormat, pretty: bool) -> Result<()> {
    let content = render(response, format, pretty)?;
    println!("{}", content);
    Ok(())
}

/// SubRip rendering of the segments
pub fn format_as_srt(result: &TranscriptResult) -> String {
    let mut output = String::new();

    for (index, segment) in result.segments.iter().enumerate() {
        output.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_timestamp(segment.start),
            format_srt_timestamp(segment.start + segment.duration),
            segment.text.trim()
        ));
    }

    output
}
