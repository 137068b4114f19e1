//! Heuristic detection of the semantic columns of a sheet
//!
//! A [`ColumnClassifier`] holds an ordered list of [`ColumnRule`]s. For each
//! [`ColumnRole`] the first rule (in list order) that matches any column wins, and
//! within that rule the first matching column (in column order) is bound. The default
//! rules are case-insensitive substring matches on "division", "risk", "hazard" and
//! "control".

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Semantic role a column can play
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Division,
    Risk,
    Hazard,
    Control,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 4] = [
        ColumnRole::Division,
        ColumnRole::Risk,
        ColumnRole::Hazard,
        ColumnRole::Control,
    ];

    /// Keyword used by the default rule for this role
    pub fn keyword(self) -> &'static str {
        match self {
            ColumnRole::Division => "division",
            ColumnRole::Risk => "risk",
            ColumnRole::Hazard => "hazard",
            ColumnRole::Control => "control",
        }
    }
}

type Matcher = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A predicate over column names bound to a role
#[derive(Clone)]
pub struct ColumnRule {
    role: ColumnRole,
    matcher: Matcher,
}

impl ColumnRule {
    /// Case-insensitive substring match on `keyword`
    pub fn keyword(role: ColumnRole, keyword: &str) -> Self {
        let needle = keyword.to_lowercase();
        ColumnRule {
            role,
            matcher: Arc::new(move |name: &str| name.to_lowercase().contains(&needle)),
        }
    }

    /// Arbitrary predicate over the (trimmed) column name
    pub fn custom<F>(role: ColumnRole, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        ColumnRule {
            role,
            matcher: Arc::new(predicate),
        }
    }

    pub fn role(&self) -> ColumnRole {
        self.role
    }

    pub fn matches(&self, column: &str) -> bool {
        (self.matcher)(column)
    }
}

impl fmt::Debug for ColumnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnRule").field("role", &self.role).finish()
    }
}

/// Columns bound to each role for one table; `None` means the dependent features are skipped
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SemanticColumns {
    pub division: Option<String>,
    pub risk: Option<String>,
    pub hazard: Option<String>,
    pub control: Option<String>,
}

impl SemanticColumns {
    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Division => self.division.as_deref(),
            ColumnRole::Risk => self.risk.as_deref(),
            ColumnRole::Hazard => self.hazard.as_deref(),
            ColumnRole::Control => self.control.as_deref(),
        }
    }

    fn set(&mut self, role: ColumnRole, column: Option<String>) {
        match role {
            ColumnRole::Division => self.division = column,
            ColumnRole::Risk => self.risk = column,
            ColumnRole::Hazard => self.hazard = column,
            ColumnRole::Control => self.control = column,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ColumnClassifier {
    rules: Vec<ColumnRule>,
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        ColumnClassifier {
            rules: ColumnRole::ALL
                .iter()
                .map(|role| ColumnRule::keyword(*role, role.keyword()))
                .collect(),
        }
    }
}

impl ColumnClassifier {
    pub fn with_rules(rules: Vec<ColumnRule>) -> Self {
        ColumnClassifier { rules }
    }

    /// Puts `rule` ahead of every existing rule for its role
    pub fn prepend(mut self, rule: ColumnRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    /// Column bound to `role`, if any
    pub fn find(&self, role: ColumnRole, columns: &[String]) -> Option<String> {
        self.rules
            .iter()
            .filter(|rule| rule.role == role)
            .find_map(|rule| columns.iter().find(|c| rule.matches(c)))
            .cloned()
    }

    pub fn classify(&self, columns: &[String]) -> SemanticColumns {
        let mut bound = SemanticColumns::default();
        for role in ColumnRole::ALL {
            bound.set(role, self.find(role, columns));
        }
        bound
    }
}
