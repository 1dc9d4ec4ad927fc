//! Assembling a normalized profile from a file catalog.

use std::collections::BTreeMap;

use argo_common::{FloatId, Measurement, Profile};
use tracing::{debug, warn};

use crate::catalog::{ProfileFile, VarData, Variable};
use crate::channels::collect_aux_channels;
use crate::error::{NetCdfError, NetCdfResult};
use crate::resolver::{LATITUDE, LONGITUDE, PLATFORM_ID, PRESSURE, SALINITY, TEMPERATURE};
use crate::sanitize::Channel;
use crate::time::TimeSource;

/// Build a [`Profile`] from a file catalog.
///
/// Fails only when latitude or longitude cannot be resolved to a finite
/// value. Every other missing piece degrades the result instead.
pub fn assemble_profile(file: &ProfileFile) -> NetCdfResult<Profile> {
    let lat_var = LATITUDE.require(file)?.variable;
    let lon_var = LONGITUDE.require(file)?.variable;
    let latitude = required_coordinate(lat_var)?;
    let longitude = required_coordinate(lon_var)?;

    let platform_var = PLATFORM_ID.resolve(file).map(|r| r.variable);
    let float_id = platform_var.and_then(coerce_platform_id);
    if float_id.is_none() {
        debug!(file = %file.path, "No platform identifier");
    }

    let time_source = TimeSource::select(file);
    let profile_time = time_source.and_then(|t| t.decode());
    if profile_time.is_none() {
        debug!(file = %file.path, "Profile time absent or undecodable");
    }

    let pres_var = PRESSURE.resolve(file).map(|r| r.variable);
    let temp_var = TEMPERATURE.resolve(file).map(|r| r.variable);
    let psal_var = SALINITY.resolve(file).map(|r| r.variable);

    let pressure = pres_var.and_then(Channel::from_variable);
    let temperature = temp_var.and_then(Channel::from_variable);
    let salinity = psal_var.and_then(Channel::from_variable);

    for (name, var, channel) in [
        ("pressure", pres_var, pressure),
        ("temperature", temp_var, temperature),
        ("salinity", psal_var, salinity),
    ] {
        if var.is_some() && channel.is_none() {
            warn!(file = %file.path, channel = name, "Primary channel is not numeric");
        } else if var.is_none() {
            debug!(file = %file.path, channel = name, "Primary channel absent");
        }
    }

    let levels = [pressure, temperature, salinity]
        .iter()
        .flatten()
        .map(Channel::len)
        .max()
        .unwrap_or(0);

    let claimed: Vec<&str> = [
        Some(lat_var),
        Some(lon_var),
        platform_var,
        time_source.map(|t| t.variable()),
        pres_var,
        temp_var,
        psal_var,
    ]
    .into_iter()
    .flatten()
    .map(|v| v.name.as_str())
    .collect();

    let aux = collect_aux_channels(file, &claimed, levels);

    let value_at = |channel: Option<Channel<'_>>, level| channel.and_then(|c| c.value_at(level));

    let measurements: Vec<Measurement> = (0..levels)
        .map(|level| {
            let extras: BTreeMap<String, f64> = aux
                .iter()
                .filter_map(|a| a.channel.value_at(level).map(|v| (a.key.clone(), v)))
                .collect();

            Measurement {
                depth: value_at(pressure, level),
                temperature: value_at(temperature, level),
                salinity: value_at(salinity, level),
                extras,
            }
        })
        .filter(|m| !m.is_empty())
        .collect();

    debug!(
        file = %file.path,
        levels = levels,
        retained = measurements.len(),
        aux_channels = aux.len(),
        "Assembled profile"
    );

    Ok(Profile {
        float_id,
        profile_time,
        latitude,
        longitude,
        source_file: file.path.clone(),
        measurements,
    })
}

fn required_coordinate(var: &Variable) -> NetCdfResult<f64> {
    var.first_valid()
        .ok_or_else(|| NetCdfError::NoFiniteValue(var.name.clone()))
}

/// Best-effort string form of a platform identifier.
///
/// Character arrays use their first row; numeric identifiers render
/// without a fractional part when integral.
pub fn coerce_platform_id(var: &Variable) -> Option<FloatId> {
    let raw = match &var.data {
        VarData::Chars(bytes) => {
            let row_len = match var.shape.as_slice() {
                [.., last] if var.shape.len() > 1 && *last > 0 => *last,
                _ => bytes.len(),
            };
            String::from_utf8_lossy(&bytes[..row_len.min(bytes.len())]).into_owned()
        }
        VarData::Text(strings) => strings.iter().find(|s| !s.trim().is_empty())?.clone(),
        VarData::Numeric(values) => {
            let v = values.iter().copied().find(|v| v.is_finite())?;
            if v.fract() == 0.0 && v.abs() < 1e15 {
                format!("{}", v as i64)
            } else {
                v.to_string()
            }
        }
    };

    let cleaned = strip_control_chars(&raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(FloatId::new(cleaned))
    }
}

fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(*c as u32, 0x00..=0x1F | 0x7F))
        .collect::<String>()
        .trim()
        .to_string()
}
