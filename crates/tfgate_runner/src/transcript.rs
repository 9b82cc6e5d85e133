//! Banner framing for command transcripts.
//!
//! CI logs and pull-request comments are matched against these strings
//! literally, so the framing must not change.

const SEPARATOR: &str = "*************";

/// Banner written before the child's stdout.
pub fn header(command_line: &str) -> String {
    format!(
        "\n{SEPARATOR}\n{SEPARATOR}\n{SEPARATOR}\n==== CMD ====\n{command_line}\n==== OUT ====\n"
    )
}

/// Banner written after the child exits.
pub fn footer(exit_code: i32) -> String {
    format!("==== END ====\nexit with {exit_code}\n\n")
}

/// Frame already-captured output the same way a live run would.
pub fn frame(command_line: &str, stdout: &str, exit_code: i32) -> String {
    format!("{}{}{}", header(command_line), stdout, footer(exit_code))
}
