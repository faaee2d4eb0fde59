use std::{fmt::Display, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Identity, // every data edge
    Label,    // label filter
    Ldf,      // label-degree-filter
    Temporal, // label-degree-interval-filter
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    Identity,
    Structural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Enumeration,
    Gql,
}

/// Bounds the work of a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Maximum number of search nodes to expand.
    Nodes(u64),
    /// Maximum wall clock time, measured from the start of the search.
    Time(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub filter: Filter,
    pub refinement: Refinement,
    pub order: Order,
    pub budget: Option<Budget>,
}

impl Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Display for Refinement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Budget::Nodes(nodes) => write!(f, "{} nodes", nodes),
            Budget::Time(duration) => write!(f, "{:?}", duration),
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.filter, self.refinement, self.order)?;
        if let Some(budget) = self.budget {
            write!(f, " (budget: {})", budget)?;
        }
        Ok(())
    }
}

impl Config {
    pub fn new(filter: Filter, refinement: Refinement, order: Order) -> Self {
        Config {
            filter,
            refinement,
            order,
            budget: None,
        }
    }

    pub fn with_budget(self, budget: Budget) -> Self {
        Config {
            budget: Some(budget),
            ..self
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            filter: Filter::Temporal,
            refinement: Refinement::Structural,
            order: Order::Enumeration,
            budget: None,
        }
    }
}

impl From<Filter> for Config {
    fn from(filter: Filter) -> Self {
        Config {
            filter,
            ..Config::default()
        }
    }
}

impl From<Refinement> for Config {
    fn from(refinement: Refinement) -> Self {
        Config {
            refinement,
            ..Config::default()
        }
    }
}

impl From<Order> for Config {
    fn from(order: Order) -> Self {
        Config {
            order,
            ..Config::default()
        }
    }
}

impl From<Budget> for Config {
    fn from(budget: Budget) -> Self {
        Config::default().with_budget(budget)
    }
}
