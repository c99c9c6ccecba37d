//! Simulated bettors

use snakebid_core::ConfigResult;
use snakebid_strategy::{AgentState, Strategy, StrategyRegistry};

/// A bettor that outlives individual games
pub struct SimAgent {
    pub name: String,
    pub strategy: Box<dyn Strategy>,
    pub balance: f64,
    pub total_spent: f64,
    pub total_earned: f64,
    pub state: AgentState,
}

impl SimAgent {
    pub fn new(name: impl Into<String>, strategy: Box<dyn Strategy>, balance: f64) -> Self {
        Self {
            name: name.into(),
            strategy,
            balance,
            total_spent: 0.0,
            total_earned: 0.0,
            state: AgentState::default(),
        }
    }

    /// Build an agent around a registered strategy
    pub fn from_registry(
        registry: &StrategyRegistry,
        name: impl Into<String>,
        strategy: &str,
        balance: f64,
    ) -> ConfigResult<Self> {
        Ok(Self::new(name, registry.create(strategy)?, balance))
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        amount <= self.balance
    }

    /// Take a stake out of the balance
    pub fn pay(&mut self, amount: f64) {
        self.balance -= amount;
        self.total_spent += amount;
    }

    pub fn credit(&mut self, amount: f64) {
        self.balance += amount;
        self.total_earned += amount;
    }

    pub fn profit(&self) -> f64 {
        self.total_earned - self.total_spent
    }

    /// Profit per unit staked; zero before the first stake
    pub fn roi(&self) -> f64 {
        if self.total_spent > 0.0 {
            self.profit() / self.total_spent
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for SimAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimAgent")
            .field("name", &self.name)
            .field("strategy", &self.strategy.name())
            .field("balance", &self.balance)
            .field("total_spent", &self.total_spent)
            .field("total_earned", &self.total_earned)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger() {
        let registry = StrategyRegistry::with_builtins();
        let mut agent = SimAgent::from_registry(&registry, "alice", "greedy", 10.0).unwrap();
        assert_eq!(agent.strategy_name(), "greedy");
        assert_eq!(agent.roi(), 0.0);

        agent.pay(4.0);
        assert!(agent.can_afford(6.0));
        assert!(!agent.can_afford(6.5));
        agent.credit(6.0);
        assert_eq!(agent.balance, 12.0);
        assert_eq!(agent.profit(), 2.0);
        assert_eq!(agent.roi(), 0.5);
    }

    #[test]
    fn test_unknown_strategy() {
        let registry = StrategyRegistry::with_builtins();
        assert!(SimAgent::from_registry(&registry, "bob", "nope", 10.0).is_err());
    }
}
