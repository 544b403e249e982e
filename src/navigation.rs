//! Side navigation sections.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Transactions,
    Employees,
    FuelTypes,
    QrPayments,
    Reports,
    Settings,
}

impl Section {
    /// In the order shown in the sidebar.
    pub const ALL: [Section; 6] = [
        Section::Transactions,
        Section::Employees,
        Section::FuelTypes,
        Section::QrPayments,
        Section::Reports,
        Section::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Transactions => "Transactions",
            Section::Employees => "Employees",
            Section::FuelTypes => "Fuel Types",
            Section::QrPayments => "QR Payments",
            Section::Reports => "Reports",
            Section::Settings => "Settings",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Section::Transactions => "/transactions",
            Section::Employees => "/employees",
            Section::FuelTypes => "/fuel-types",
            Section::QrPayments => "/qr-payments",
            Section::Reports => "/reports",
            Section::Settings => "/settings",
        }
    }

    /// Subtitle under the page heading.
    pub fn description(self) -> &'static str {
        match self {
            Section::Transactions => "Manage fuel transactions and payments",
            Section::Employees => "Manage your fuel station staff",
            Section::FuelTypes => "Track fuel types, prices, and inventory",
            Section::QrPayments => "Accept payments via QR codes and digital wallets",
            Section::Reports => "Comprehensive business insights",
            Section::Settings => "Backend connection and application info",
        }
    }

    /// Resolve a route path. Trailing slashes and query strings are ignored.
    pub fn from_path(path: &str) -> Option<Section> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        Section::ALL.into_iter().find(|s| s.path() == path)
    }
}
