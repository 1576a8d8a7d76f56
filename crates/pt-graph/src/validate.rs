//! Reference resolution and wiring performed by `GraphBuilder::build`.

use pt_components::{Component, Device, DeviceKind, Line};
use pt_core::{CompId, LineId};

use crate::error::{GraphError, GraphResult};
use crate::indexing::NameIndex;

fn resolve(names: &NameIndex, id: &str) -> GraphResult<CompId> {
    names
        .get(id)
        .ok_or_else(|| GraphError::UnknownComponent { id: id.to_string() })
}

/// Turn `(id, source, target)` triples into lines with arena endpoints.
pub(crate) fn resolve_lines(
    names: &NameIndex,
    raw: &[(String, String, String)],
) -> GraphResult<Vec<Line>> {
    raw.iter()
        .map(|(id, source, target)| {
            Ok(Line::new(
                id.clone(),
                resolve(names, source)?,
                resolve(names, target)?,
            ))
        })
        .collect()
}

/// Apply declared pump sources. Each must be a tank.
pub(crate) fn resolve_pump_sources(
    components: &mut [Component],
    names: &NameIndex,
    declared: &[(CompId, String)],
) -> GraphResult<()> {
    for (pump, source_name) in declared {
        let source = resolve(names, source_name)?;
        let kind = components[source.slot()].kind();
        if kind != DeviceKind::Tank {
            return Err(GraphError::InvalidPumpSource {
                pump: components[pump.slot()].id.clone(),
                source: source_name.clone(),
                kind,
            });
        }
        if let Some(p) = components[pump.slot()].device.as_pump_mut() {
            p.source = Some(source);
        }
    }
    Ok(())
}

/// Record every line on its endpoints.
///
/// - splitters collect their outputs, a pump takes exactly one outlet
/// - a tank-to-pump line sets the pump's source when none was declared
pub(crate) fn wire_lines(components: &mut [Component], lines: &[Line]) -> GraphResult<()> {
    for (i, line) in lines.iter().enumerate() {
        let lid = LineId::from_index(i as u32);
        let source_kind = components[line.source.slot()].kind();

        let source = &mut components[line.source.slot()];
        match &mut source.device {
            Device::Tank(_) => {}
            Device::Splitter(s) => s.outputs.push(lid),
            Device::Pump(p) => {
                if let Some(existing) = p.outlet {
                    return Err(GraphError::PumpOutletConflict {
                        pump: source.id.clone(),
                        existing: lines[existing.slot()].id.clone(),
                        line: line.id.clone(),
                    });
                }
                p.outlet = Some(lid);
            }
        }

        if let Device::Pump(p) = &mut components[line.target.slot()].device
            && p.source.is_none()
            && source_kind == DeviceKind::Tank
        {
            p.source = Some(line.source);
        }
    }
    Ok(())
}

pub(crate) fn warn_idle_pumps(components: &[Component]) {
    for comp in components {
        if let Device::Pump(p) = &comp.device {
            if p.source.is_none() {
                tracing::warn!(pump = %comp.id, "pump has no source tank and will not transfer");
            }
            if p.outlet.is_none() {
                tracing::warn!(pump = %comp.id, "pump has no outlet line");
            }
        }
    }
}
