/// Output column and the notice that sets it, as published on station pages.
pub static FLAG_KEYWORDS: &[(&str, &str)] = &[
    ("estacion_accesible", "Estación accesible"),
    ("cobertura_movil", "Estación con cobertura móvil"),
    ("escaleras_mecanicas", "Estación con escaleras mecánicas"),
    ("ascensores", "Estación con ascensor"),
    ("wifi_gratuito", "Estación con Wifi gratuito"),
];

/// Accessibility features of a station, in [`FLAG_KEYWORDS`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessibilityFlags([bool; 5]);

impl AccessibilityFlags {
    /// A flag is set when any sentence contains its keyword.
    pub fn from_sentences(sentences: &[String]) -> Self {
        let mut flags = [false; 5];
        for (flag, (_, keyword)) in flags.iter_mut().zip(FLAG_KEYWORDS) {
            *flag = sentences.iter().any(|s| s.contains(*keyword));
        }
        Self(flags)
    }

    pub fn columns() -> impl Iterator<Item = &'static str> {
        FLAG_KEYWORDS.iter().map(|(column, _)| *column)
    }

    /// `0`/`1` cells for the flag columns.
    pub fn cells(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().map(|&set| u8::from(set).to_string())
    }

    pub fn accessible(&self) -> bool {
        self.0[0]
    }
}
