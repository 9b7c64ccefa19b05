use std::io::Write;

use anyhow::{Context, Result};
use glmesh_model::ZoneStore;
use glmesh_wire::Address;
use serde_json::{json, Value};

use crate::app::{RuntimeContext, ZoneAction, ZoneCommand};

pub fn run(ctx: &RuntimeContext, out: &mut dyn Write, command: &ZoneCommand) -> Result<()> {
    let file = ctx.zones_file();
    let mut zones =
        ZoneStore::load(&file).with_context(|| format!("loading {}", file.path().display()))?;
    let changed = match &command.action {
        ZoneAction::List => return list(ctx, out, &zones),
        ZoneAction::Coord { address, label: None } => {
            return show_coordinate(ctx, out, &zones, *address);
        }
        ZoneAction::Coord { address, label: Some(label) } => {
            zones.set_coordinate(*address, label.clone())
        }
        ZoneAction::Add { number, name } => zones.add_zone(name.clone(), *number),
        ZoneAction::Remove { number } => zones.remove_zone(*number).is_some(),
        ZoneAction::Rename { number, name } => zones.rename_zone(*number, name.clone()),
        ZoneAction::Assign { number, address } => zones.assign(*number, *address),
        ZoneAction::Unassign { address } => zones.unassign(*address),
    };
    if changed {
        zones.save(&file).with_context(|| format!("saving {}", file.path().display()))?;
    } else {
        log::warn!("zone: nothing changed");
    }
    let value = json!({ "changed": changed });
    ctx.output.emit(out, &value, |w| writeln!(w, "{}", if changed { "ok" } else { "unchanged" }))
}

fn list(ctx: &RuntimeContext, out: &mut dyn Write, zones: &ZoneStore) -> Result<()> {
    let rows: Vec<Value> = zones
        .zones()
        .iter()
        .map(|zone| {
            json!({
                "number": zone.number,
                "name": zone.name,
                "nodes": zone.node_addresses().map(Address::to_hex).collect::<Vec<_>>(),
            })
        })
        .collect();
    let value = Value::from(rows);
    ctx.output.emit(out, &value, |w| {
        for zone in zones.zones() {
            let nodes: Vec<String> =
                zone.node_addresses().map(|address| address.to_string()).collect();
            writeln!(w, "{:>3}  {:<12} {}", zone.number, zone.name, nodes.join(" "))?;
        }
        Ok(())
    })
}

fn show_coordinate(
    ctx: &RuntimeContext,
    out: &mut dyn Write,
    zones: &ZoneStore,
    address: Address,
) -> Result<()> {
    let label = zones.coordinate(address);
    let value = json!({ "address": address.to_hex(), "coordinate": label });
    ctx.output.emit(out, &value, |w| writeln!(w, "{address}: {}", label.unwrap_or("-")))
}
