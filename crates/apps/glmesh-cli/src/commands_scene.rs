use std::io::Write;

use anyhow::{Context, Result};
use glmesh_model::{FileStore, Scene, SceneStore};
use glmesh_wire::Address;
use serde_json::{json, Value};

use crate::app::{RuntimeContext, SceneAction, SceneCommand};

pub fn run(ctx: &RuntimeContext, out: &mut dyn Write, command: &SceneCommand) -> Result<()> {
    let file = ctx.scenes_file();
    let mut scenes = load(&file)?;
    let changed = match &command.action {
        SceneAction::List => return list(ctx, out, &scenes),
        SceneAction::Add { number, name, detail } => {
            let scene = Scene::new(*number, name.clone())
                .with_detail(detail.clone().unwrap_or_default());
            scenes.add(scene)
        }
        SceneAction::Remove { number } => scenes.remove(*number).is_some(),
        SceneAction::Rename { number, name } => scenes.rename(*number, name.clone()),
        SceneAction::Register { number, address } => scenes.register(*number, *address),
        SceneAction::Unregister { number, address } => scenes.unregister(*number, *address),
    };
    if changed {
        scenes.save(&file).with_context(|| format!("saving {}", file.path().display()))?;
    } else {
        log::warn!("scene: nothing changed");
    }
    let value = json!({ "changed": changed });
    ctx.output.emit(out, &value, |w| writeln!(w, "{}", if changed { "ok" } else { "unchanged" }))
}

/// A missing file means a fresh network: the built-in modes only.
fn load(file: &FileStore) -> Result<SceneStore> {
    if !file.path().exists() {
        return Ok(SceneStore::with_defaults());
    }
    SceneStore::load(file).with_context(|| format!("loading {}", file.path().display()))
}

fn list(ctx: &RuntimeContext, out: &mut dyn Write, scenes: &SceneStore) -> Result<()> {
    let ordered = scenes.ordered();
    let rows: Vec<Value> = ordered
        .iter()
        .map(|scene| {
            json!({
                "number": format!("{:04X}", scene.number()),
                "name": scene.name,
                "detail": scene.detail,
                "default": scene.is_default(),
                "addresses": scene.addresses().map(Address::to_hex).collect::<Vec<_>>(),
            })
        })
        .collect();
    let value = Value::from(rows);
    ctx.output.emit(out, &value, |w| {
        for scene in &ordered {
            let addresses: Vec<String> =
                scene.addresses().map(|address| address.to_string()).collect();
            writeln!(w, "{:04X}  {:<12} {}", scene.number(), scene.name, addresses.join(" "))?;
        }
        Ok(())
    })
}
