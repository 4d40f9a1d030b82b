//! Expense model
//!
//! An expense belongs to exactly one month bucket and references its
//! category by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, UserId};
use super::money::Money;
use super::month::MonthKey;

/// How an expense recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseType {
    #[serde(rename = "Fijo")]
    Fixed,
    #[serde(rename = "Variable")]
    Variable,
    #[serde(rename = "Cuotas")]
    Installments,
    #[serde(rename = "Única vez")]
    OneTime,
}

impl ExpenseType {
    /// All types, in the order breakdowns list them
    pub fn all() -> &'static [Self] {
        &[Self::Fixed, Self::Variable, Self::Installments, Self::OneTime]
    }

    /// Parse from user input, accepting the stored labels and English names
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fijo" | "fixed" => Some(Self::Fixed),
            "variable" => Some(Self::Variable),
            "cuotas" | "installments" => Some(Self::Installments),
            "única vez" | "unica vez" | "unica" | "once" | "one-time" | "onetime" => {
                Some(Self::OneTime)
            }
            _ => None,
        }
    }

    /// The stored label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fixed => "Fijo",
            Self::Variable => "Variable",
            Self::Installments => "Cuotas",
            Self::OneTime => "Única vez",
        }
    }
}

impl Default for ExpenseType {
    fn default() -> Self {
        Self::Variable
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Tarjeta")]
    Card,
    #[serde(rename = "Cash")]
    Cash,
    #[serde(rename = "Transferencia")]
    Transfer,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tarjeta" | "card" => Some(Self::Card),
            "cash" | "efectivo" => Some(Self::Cash),
            "transferencia" | "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Card => "Tarjeta",
            Self::Cash => "Cash",
            Self::Transfer => "Transferencia",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The `expenses` table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// Owning user
    pub user_id: UserId,

    /// What the money was spent on
    pub name: String,

    /// Category name (not an id)
    pub category: String,

    pub amount: Money,

    /// Share of the salary at write time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_percentage: Option<f64>,

    pub expense_type: ExpenseType,

    pub payment_method: PaymentMethod,

    /// Installment count, only for `Cuotas`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,

    /// The month bucket
    pub month: MonthKey,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Build a row from user input for `month`, snapshotting the salary share
    pub fn from_input(user_id: UserId, month: MonthKey, input: &NewExpense, salary: Money) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            user_id,
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            amount: input.amount,
            salary_percentage: input.amount.percentage_of(salary),
            expense_type: input.expense_type,
            payment_method: input.payment_method,
            installments: installments_for(input.expense_type, input.installments),
            month,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit. The salary share is taken again from the current
    /// salary, as when the expense was recorded.
    pub fn apply(&mut self, update: &ExpenseUpdate, salary: Money) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = &update.category {
            self.category = category.trim().to_string();
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        self.salary_percentage = self.amount.percentage_of(salary);
        if let Some(expense_type) = update.expense_type {
            self.expense_type = expense_type;
        }
        if let Some(method) = update.payment_method {
            self.payment_method = method;
        }
        if let Some(installments) = update.installments {
            self.installments = installments;
        }
        self.installments = installments_for(self.expense_type, self.installments);
        self.updated_at = Utc::now();
    }

    /// Whether `term` occurs in the name or category, ignoring case
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.category.to_lowercase().contains(&term)
    }

    /// Validate the row
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        validate_fields(&self.name, &self.category, self.amount, self.installments)
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.amount)
    }
}

fn installments_for(expense_type: ExpenseType, installments: Option<u32>) -> Option<u32> {
    if expense_type == ExpenseType::Installments {
        installments
    } else {
        None
    }
}

fn validate_fields(
    name: &str,
    category: &str,
    amount: Money,
    installments: Option<u32>,
) -> Result<(), ExpenseValidationError> {
    if name.trim().is_empty() {
        return Err(ExpenseValidationError::EmptyName);
    }
    if category.trim().is_empty() {
        return Err(ExpenseValidationError::MissingCategory);
    }
    if !amount.is_positive() {
        return Err(ExpenseValidationError::NonPositiveAmount);
    }
    if installments == Some(0) {
        return Err(ExpenseValidationError::ZeroInstallments);
    }
    Ok(())
}

/// User input for a new expense
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub name: String,
    pub category: String,
    pub amount: Money,
    pub expense_type: ExpenseType,
    pub payment_method: PaymentMethod,
    pub installments: Option<u32>,
}

impl NewExpense {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        amount: Money,
        expense_type: ExpenseType,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            amount,
            expense_type,
            payment_method,
            installments: None,
        }
    }

    pub fn with_installments(mut self, installments: u32) -> Self {
        self.installments = Some(installments);
        self
    }

    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        validate_fields(&self.name, &self.category, self.amount, self.installments)
    }
}

/// Partial edit of an expense; `None` fields are left unchanged.
/// `installments: Some(None)` clears the count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Money>,
    pub expense_type: Option<ExpenseType>,
    pub payment_method: Option<PaymentMethod>,
    pub installments: Option<Option<u32>>,
}

impl ExpenseUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    EmptyName,
    MissingCategory,
    NonPositiveAmount,
    ZeroInstallments,
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Expense name cannot be empty"),
            Self::MissingCategory => write!(f, "Expense must have a category"),
            Self::NonPositiveAmount => write!(f, "Amount must be greater than zero"),
            Self::ZeroInstallments => write!(f, "Installment count must be at least 1"),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn month() -> MonthKey {
        MonthKey::parse("2026-10").unwrap()
    }

    fn supermercado() -> NewExpense {
        NewExpense::new(
            "Supermercado",
            "Alimentación",
            Money::from_units(5000),
            ExpenseType::Fixed,
            PaymentMethod::Cash,
        )
    }

    #[test]
    fn test_percentage_snapshot() {
        let expense = Expense::from_input(
            UserId::new(),
            month(),
            &supermercado(),
            Money::from_units(50000),
        );
        assert_eq!(expense.salary_percentage, Some(10.0));
        assert_eq!(expense.month, month());
    }

    #[test]
    fn test_no_percentage_without_salary() {
        let expense = Expense::from_input(UserId::new(), month(), &supermercado(), Money::zero());
        assert_eq!(expense.salary_percentage, None);
    }

    #[test]
    fn test_installments_only_for_cuotas() {
        let input = supermercado().with_installments(6);
        let expense = Expense::from_input(UserId::new(), month(), &input, Money::zero());
        assert_eq!(expense.installments, None);

        let mut input = input;
        input.expense_type = ExpenseType::Installments;
        let mut expense = Expense::from_input(UserId::new(), month(), &input, Money::zero());
        assert_eq!(expense.installments, Some(6));

        expense.apply(
            &ExpenseUpdate {
                expense_type: Some(ExpenseType::Variable),
                ..Default::default()
            },
            Money::zero(),
        );
        assert_eq!(expense.installments, None);
    }

    #[test]
    fn test_edit_takes_percentage_from_current_salary() {
        let mut expense = Expense::from_input(
            UserId::new(),
            month(),
            &supermercado(),
            Money::from_units(50000),
        );

        expense.apply(
            &ExpenseUpdate {
                name: Some("Super".into()),
                ..Default::default()
            },
            Money::from_units(100000),
        );
        assert_eq!(expense.salary_percentage, Some(5.0));

        expense.apply(
            &ExpenseUpdate {
                amount: Some(Money::from_units(10000)),
                ..Default::default()
            },
            Money::from_units(100000),
        );
        assert_eq!(expense.salary_percentage, Some(10.0));
        assert_eq!(expense.amount, Money::from_units(10000));

        expense.apply(&ExpenseUpdate::default(), Money::zero());
        assert_eq!(expense.salary_percentage, None);
    }

    #[test]
    fn test_matches() {
        let expense = Expense::from_input(UserId::new(), month(), &supermercado(), Money::zero());
        assert!(expense.matches("SUPER"));
        assert!(expense.matches("aliment"));
        assert!(!expense.matches("nafta"));
    }

    #[test]
    fn test_validation() {
        let mut input = supermercado();
        assert!(input.validate().is_ok());

        input.amount = Money::zero();
        assert_eq!(input.validate(), Err(ExpenseValidationError::NonPositiveAmount));

        input.amount = Money::from_units(1);
        input.category = " ".into();
        assert_eq!(input.validate(), Err(ExpenseValidationError::MissingCategory));
    }

    #[test]
    fn test_enum_labels_serialize() {
        assert_eq!(
            serde_json::to_string(&ExpenseType::OneTime).unwrap(),
            "\"Única vez\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Card).unwrap(),
            "\"Tarjeta\""
        );
        assert!(serde_json::from_str::<ExpenseType>("\"Mensual\"").is_err());
        assert_eq!(ExpenseType::parse("cuotas"), Some(ExpenseType::Installments));
        assert_eq!(PaymentMethod::parse("transfer"), Some(PaymentMethod::Transfer));
    }
}
