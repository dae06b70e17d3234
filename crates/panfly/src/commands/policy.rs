//! Rule base command handlers.

use tabled::Tabled;

use panfly_core::{NatRule, RuleLayer, SecurityRule};

use crate::cli::{LayerArg, PolicyArgs, PolicyCommand, RuleListArgs};
use crate::error::CliError;
use crate::output::{self, members_cell, or_dash, time_cell};

use super::Ctx;

#[derive(Tabled)]
struct SecurityRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Layer")]
    layer: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Applications")]
    applications: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Hits")]
    hits: i64,
    #[tabled(rename = "Last Hit")]
    last_hit: String,
}

#[derive(Tabled)]
struct NatRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Layer")]
    layer: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Source NAT")]
    source_translation: String,
    #[tabled(rename = "Destination NAT")]
    destination_translation: String,
    #[tabled(rename = "Hits")]
    hits: i64,
}

fn layer_matches(filter: Option<LayerArg>, layer: RuleLayer) -> bool {
    match filter {
        None => true,
        Some(LayerArg::Pre) => layer == RuleLayer::Pre,
        Some(LayerArg::Local) => layer == RuleLayer::Local,
        Some(LayerArg::Post) => layer == RuleLayer::Post,
    }
}

fn name_cell(name: &str, disabled: bool, color: bool) -> String {
    if disabled {
        output::warn_cell(&format!("{name} (disabled)"), color)
    } else {
        name.to_owned()
    }
}

pub async fn handle(ctx: &Ctx<'_>, args: PolicyArgs) -> Result<(), CliError> {
    let format = ctx.global.output;
    let color = ctx.color;

    let out = match args.command {
        PolicyCommand::Security(RuleListArgs { layer, unused }) => {
            let mut rules = ctx.firewall.security_rules(&ctx.cancel).await?;
            rules.retain(|r| layer_matches(layer, r.layer) && (!unused || r.hit_count == 0));
            output::render_list(
                format,
                &rules,
                |r: &SecurityRule| SecurityRow {
                    position: r.position,
                    layer: r.layer.to_string(),
                    name: name_cell(&r.name, r.disabled, color),
                    from: members_cell(&r.from_zones),
                    to: members_cell(&r.to_zones),
                    applications: members_cell(&r.applications),
                    action: output::status_cell(&r.action, r.action == "allow", color),
                    hits: r.hit_count,
                    last_hit: time_cell(r.last_hit),
                },
                |r| r.name.clone(),
            )
        }

        PolicyCommand::Nat(RuleListArgs { layer, unused }) => {
            let mut rules = ctx.firewall.nat_rules(&ctx.cancel).await?;
            rules.retain(|r| layer_matches(layer, r.layer) && (!unused || r.hit_count == 0));
            output::render_list(
                format,
                &rules,
                |r: &NatRule| NatRow {
                    position: r.position,
                    layer: r.layer.to_string(),
                    name: name_cell(&r.name, r.disabled, color),
                    from: members_cell(&r.from_zones),
                    to: members_cell(&r.to_zones),
                    source_translation: or_dash(&r.source_translation),
                    destination_translation: or_dash(&r.destination_translation),
                    hits: r.hit_count,
                },
                |r| r.name.clone(),
            )
        }
    };

    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
