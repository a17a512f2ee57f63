//! Instructions for the built-in agents

/// Instructions of `one_tool_agent`
pub const ONE_TOOL_AGENT_INSTRUCTIONS: &str = "You are a helpful assistant running on a local Linux machine. \
You can run shell commands with the generic_linux_command tool. \
Use it when a question needs information from the system, then answer briefly using the command output. \
Do not run commands that modify or delete files.";

/// Instructions of `basic_agent`
pub const BASIC_AGENT_INSTRUCTIONS: &str =
    "You are a helpful assistant. Answer the user's question concisely.";

/// Host facts appended to every system prompt
pub fn build_system_context() -> String {
    let working_dir = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!(
        "- Operating system: {}\n- Architecture: {}\n- Working directory: {}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        working_dir
    )
}

/// Full system prompt for an agent with the given tools
pub fn build_system_prompt(instructions: &str, tool_names: &[&str]) -> String {
    let mut prompt = format!(
        "{}\n\n[System Context]:\n{}",
        instructions,
        build_system_context()
    );
    if !tool_names.is_empty() {
        prompt.push_str(&format!("\n\nAvailable tools: {}", tool_names.join(", ")));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_tools() {
        let prompt = build_system_prompt("Be useful.", &["generic_linux_command"]);
        assert!(prompt.starts_with("Be useful."));
        assert!(prompt.contains(std::env::consts::OS));
        assert!(prompt.ends_with("Available tools: generic_linux_command"));
    }

    #[test]
    fn test_system_prompt_without_tools() {
        let prompt = build_system_prompt(BASIC_AGENT_INSTRUCTIONS, &[]);
        assert!(!prompt.contains("Available tools"));
    }
}
