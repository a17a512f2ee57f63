//! Agent listing command

use anyhow::Result;
use lmprobe_core::tools::ToolRegistry;
use lmprobe_core::{AgentRegistry, BuiltinAgentRegistry};
use tracing::info;

/// Show the agents shipped with lmprobe
pub async fn agents_command() -> Result<i32> {
    info!("Listing available agents");

    println!("🤖 Available Agents\n");

    let registry = BuiltinAgentRegistry::new();
    let tools = ToolRegistry::default();

    for agent in registry.list() {
        println!("📦 {}", agent.name());
        println!("   {}", agent.description());
        if agent.tools().is_empty() {
            println!("   tools: none\n");
        } else {
            println!("   tools: {}", agent.tools().join(", "));
            for tool in agent.tools() {
                if let Some((_, description)) = tools.get_tool_info(tool) {
                    println!("     - {}: {}", tool, description);
                }
            }
            println!();
        }
    }

    println!("💡 Pick one with --agent <name> or LMPROBE_AGENT");

    Ok(0)
}
