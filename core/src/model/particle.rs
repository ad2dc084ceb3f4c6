use serde::{Deserialize, Serialize};
use std::fmt;

/// Morphological class of a detected particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleType {
    Fiber,
    Fragment,
    Film,
    Pellet,
    Foam,
}

impl ParticleType {
    pub const ALL: [ParticleType; 5] = [
        ParticleType::Fiber,
        ParticleType::Fragment,
        ParticleType::Film,
        ParticleType::Pellet,
        ParticleType::Foam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParticleType::Fiber => "fiber",
            ParticleType::Fragment => "fragment",
            ParticleType::Film => "film",
            ParticleType::Pellet => "pellet",
            ParticleType::Foam => "foam",
        }
    }

    /// Overlay and legend colour for this particle class.
    pub fn color(self) -> Hsl {
        match self {
            ParticleType::Fiber => Hsl::new(200.0, 80.0, 50.0),
            ParticleType::Fragment => Hsl::new(340.0, 75.0, 55.0),
            ParticleType::Film => Hsl::new(45.0, 90.0, 50.0),
            ParticleType::Pellet => Hsl::new(280.0, 60.0, 55.0),
            ParticleType::Foam => Hsl::new(120.0, 50.0, 45.0),
        }
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chemical class inferred from the (simulated) LDIR spectrum match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolymerType {
    #[serde(rename = "PE")]
    Pe,
    #[serde(rename = "PP")]
    Pp,
    #[serde(rename = "PS")]
    Ps,
    #[serde(rename = "PET")]
    Pet,
    #[serde(rename = "PVC")]
    Pvc,
    #[serde(rename = "PA")]
    Pa,
    Unknown,
}

impl PolymerType {
    pub const ALL: [PolymerType; 7] = [
        PolymerType::Pe,
        PolymerType::Pp,
        PolymerType::Ps,
        PolymerType::Pet,
        PolymerType::Pvc,
        PolymerType::Pa,
        PolymerType::Unknown,
    ];

    /// Polymers the generator can assign. `Unknown` is schema-only.
    pub const IDENTIFIABLE: [PolymerType; 6] = [
        PolymerType::Pe,
        PolymerType::Pp,
        PolymerType::Ps,
        PolymerType::Pet,
        PolymerType::Pvc,
        PolymerType::Pa,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PolymerType::Pe => "PE",
            PolymerType::Pp => "PP",
            PolymerType::Ps => "PS",
            PolymerType::Pet => "PET",
            PolymerType::Pvc => "PVC",
            PolymerType::Pa => "PA",
            PolymerType::Unknown => "Unknown",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            PolymerType::Pe => "Polyethylene",
            PolymerType::Pp => "Polypropylene",
            PolymerType::Ps => "Polystyrene",
            PolymerType::Pet => "Polyethylene Terephthalate",
            PolymerType::Pvc => "Polyvinyl Chloride",
            PolymerType::Pa => "Polyamide (Nylon)",
            PolymerType::Unknown => "Unknown Polymer",
        }
    }

    /// First word of the full name, used in compact table cells.
    pub fn short_name(self) -> &'static str {
        let name = self.full_name();
        name.split(' ').next().unwrap_or(name)
    }
}

impl fmt::Display for PolymerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Colour in HSL space; saturation and lightness are percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Converts to RGB components in `[0, 1]`.
    pub fn to_rgb(self) -> [f32; 3] {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = self.hue.rem_euclid(360.0) / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        [r + m, g + m, b + m]
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_colors_render_as_css() {
        assert_eq!(ParticleType::Fiber.color().to_string(), "hsl(200, 80%, 50%)");
        assert_eq!(ParticleType::Fragment.color().to_string(), "hsl(340, 75%, 55%)");
        assert_eq!(ParticleType::Film.color().to_string(), "hsl(45, 90%, 50%)");
        assert_eq!(ParticleType::Pellet.color().to_string(), "hsl(280, 60%, 55%)");
        assert_eq!(ParticleType::Foam.color().to_string(), "hsl(120, 50%, 45%)");
    }

    #[test]
    fn particle_colors_are_distinct() {
        for (i, a) in ParticleType::ALL.iter().enumerate() {
            for b in &ParticleType::ALL[i + 1..] {
                assert_ne!(a.color(), b.color());
            }
        }
    }

    #[test]
    fn hsl_converts_to_rgb() {
        let [r, g, b] = ParticleType::Foam.color().to_rgb();
        assert!((r - 0.225).abs() < 1e-4);
        assert!((g - 0.675).abs() < 1e-4);
        assert!((b - 0.225).abs() < 1e-4);

        let [r, g, b] = Hsl::new(0.0, 0.0, 100.0).to_rgb();
        assert_eq!([r, g, b], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn polymer_names_cover_every_code() {
        let names: Vec<_> = PolymerType::ALL.iter().map(|p| p.full_name()).collect();
        assert_eq!(
            names,
            vec![
                "Polyethylene",
                "Polypropylene",
                "Polystyrene",
                "Polyethylene Terephthalate",
                "Polyvinyl Chloride",
                "Polyamide (Nylon)",
                "Unknown Polymer",
            ]
        );
        assert_eq!(PolymerType::Pvc.short_name(), "Polyvinyl");
        assert_eq!(PolymerType::Pa.short_name(), "Polyamide");
    }

    #[test]
    fn types_serialize_with_wire_names() {
        assert_eq!(serde_json::to_string(&ParticleType::Pellet).unwrap(), "\"pellet\"");
        assert_eq!(serde_json::to_string(&PolymerType::Pet).unwrap(), "\"PET\"");
        assert_eq!(
            serde_json::to_string(&PolymerType::Unknown).unwrap(),
            "\"Unknown\""
        );
        let parsed: PolymerType = serde_json::from_str("\"PVC\"").unwrap();
        assert_eq!(parsed, PolymerType::Pvc);
    }
}
