use std::io::Write;

use anyhow::{Context, Result};
use glmesh_wire::{MessageKind, MessageRegistry, VendorRequest};
use serde_json::json;

use crate::app::RuntimeContext;

pub fn opcode(ctx: &RuntimeContext, out: &mut dyn Write, kind: &str) -> Result<()> {
    let kind: MessageKind = kind.parse()?;
    let opcode = kind.opcode(ctx.company_id);
    let bytes = hex::encode(&opcode.to_be_bytes()[1..]);
    let value = json!({
        "kind": kind.as_str(),
        "code": kind.code(),
        "opcode": format!("0x{opcode:08X}"),
        "bytes": bytes,
    });
    ctx.output.emit(out, &value, |w| writeln!(w, "{kind}: 0x{opcode:08X} ({bytes})"))
}

pub fn encode(
    ctx: &RuntimeContext,
    out: &mut dyn Write,
    kind: &str,
    value: Option<&str>,
) -> Result<()> {
    let kind: MessageKind = kind.parse()?;
    let request = VendorRequest::parse(kind, value)
        .with_context(|| format!("cannot build a {kind} request from {value:?}"))?;
    let message = request.encode(ctx.company_id).with_context(|| format!("encoding {kind}"))?;
    let frame = hex::encode(message.to_bytes());
    let payload = hex::encode(message.payload());
    let value = json!({
        "kind": kind.as_str(),
        "opcode": format!("0x{:08X}", message.opcode()),
        "payload": payload,
        "frame": frame,
    });
    ctx.output.emit(out, &value, |w| writeln!(w, "{frame}"))
}

pub fn decode(
    ctx: &RuntimeContext,
    out: &mut dyn Write,
    opcode: &str,
    payload: &str,
) -> Result<()> {
    let digits = opcode.trim().trim_start_matches("0x").trim_start_matches("0X");
    let opcode =
        u32::from_str_radix(digits, 16).with_context(|| format!("invalid opcode {opcode:?}"))?;
    let payload =
        hex::decode(payload.trim()).with_context(|| format!("invalid payload {payload:?}"))?;
    let registry = MessageRegistry::new(ctx.company_id);
    match registry.decode(opcode, &payload) {
        Some(inbound) => {
            let kind = inbound.kind();
            let status = format!("{:?}", inbound.status);
            let value = json!({ "kind": kind.as_str(), "status": status });
            ctx.output.emit(out, &value, |w| writeln!(w, "{kind}: {status}"))
        }
        None => {
            let value = json!({ "kind": null, "opcode": format!("0x{opcode:08X}") });
            ctx.output.emit(out, &value, |w| writeln!(w, "unrecognized 0x{opcode:08X}"))
        }
    }
}
