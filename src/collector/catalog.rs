use crate::config::Profile;

/// Скаляры по умолчанию, если профиль их не переопределяет
pub const DEFAULT_SCALARS: &[(&str, &str)] = &[
    ("sysDescr", "1.3.6.1.2.1.1.1.0"),
    ("sysServices", "1.3.6.1.2.1.1.7.0"),
    ("hrSystemUptime", "1.3.6.1.2.1.25.1.1.0"),
    ("hrSystemDate", "1.3.6.1.2.1.25.1.2.0"),
    // Есть не у всех агентов, ошибка просто попадёт в запись
    ("hrMemorySize", "1.3.6.1.2.1.25.2.2.0"),
];

/// Именованные OID скаляров, запрашиваемые у каждого устройства
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCatalog {
    entries: Vec<(String, String)>,
}

impl MetricCatalog {
    pub fn builtin() -> Self {
        Self::from_pairs(DEFAULT_SCALARS.iter().copied())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(name, oid)| (name.to_string(), oid.to_string()))
                .collect(),
        }
    }

    pub fn from_profile(profile: &Profile) -> Self {
        Self::from_pairs(profile.scalars.iter().map(|(n, o)| (n.as_str(), o.as_str())))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, o)| (n.as_str(), o.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
