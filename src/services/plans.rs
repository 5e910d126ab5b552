//! Subscription plans offered on the pricing page.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PlanExtra {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    pub subtitle: &'static str,
    /// Amount charged through the gateway
    pub amount: Decimal,
    pub currency: &'static str,
    pub features: &'static [&'static str],
    pub extra: PlanExtra,
    pub popular: bool,
    pub is_free_trial: bool,
}

impl Plan {
    /// Free-trial plans are activated without a gateway checkout.
    pub fn requires_payment(&self) -> bool {
        !self.is_free_trial
    }
}

pub static PLANS: [Plan; 3] = [
    Plan {
        id: "pet-owners",
        name: "Pet Owners",
        subtitle: "B2C SAAS",
        amount: dec!(2400),
        currency: "LKR",
        features: &[
            "AI skin disease detection",
            "Behavioral tracking & alerts",
            "Personalized diet plans",
            "Nearby pharmacy finder",
            "Health score dashboard",
        ],
        extra: PlanExtra {
            title: "Tele-vet Consultations",
            description: "LKR 4,500 - 7,500 per session",
        },
        popular: false,
        is_free_trial: true,
    },
    Plan {
        id: "pet-pharmacies",
        name: "Pet Pharmacies",
        subtitle: "B2B COMMERCE",
        amount: dec!(10000),
        currency: "LKR",
        features: &[
            "Inventory management",
            "Real-time clinic integration",
            "AI demand forecasting",
            "Automated reordering",
            "Targeted promotions",
        ],
        extra: PlanExtra {
            title: "Revenue Share",
            description: "SaaS License + 3% transaction commission",
        },
        popular: true,
        is_free_trial: false,
    },
    Plan {
        id: "veterinary-clinics",
        name: "Veterinary Clinics",
        subtitle: "B2B PROFESSIONAL",
        amount: dec!(20000),
        currency: "LKR",
        features: &[
            "AI-assisted diagnostics",
            "Patient health records",
            "Analytics dashboard",
            "Pharmacy integration",
            "Multi-branch support",
        ],
        extra: PlanExtra {
            title: "Tiered SaaS",
            description: "Flexible pricing based on clinic size",
        },
        popular: false,
        is_free_trial: false,
    },
];

pub fn all_plans() -> &'static [Plan] {
    &PLANS
}

pub fn find_plan(plan_id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|plan| plan.id == plan_id)
}
