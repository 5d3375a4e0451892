//! # CLI Argument Definitions
//!
//! Subcommands of the `abook` admin console, one group per entity.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "abook")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Admin console of the Brazilian address book")]
pub struct Cli {
    /// Configuration file (defaults to `abook.*` in the working directory, optional)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print records as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage states (Estados)
    State {
        #[command(subcommand)]
        action: StateAction,
    },
    /// Manage cities (Cidades)
    City {
        #[command(subcommand)]
        action: CityAction,
    },
    /// Manage addresses (Endereços)
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum StateAction {
    /// Create a state together with its city
    Add {
        #[arg(short, long)]
        name: String,
        /// Two-letter abbreviation (e.g. 'SP')
        #[arg(short, long)]
        abbreviation: String,
        /// City created in the same transaction; the admin inline takes exactly one
        #[arg(long)]
        city: Vec<String>,
    },
    /// List states ordered by abbreviation
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a state and its cities
    Show { id: String },
    /// Replace the fields of a state
    Update {
        id: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        abbreviation: String,
    },
    /// Delete a state with all of its cities and addresses
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum CityAction {
    Add {
        #[arg(short, long)]
        name: String,
        /// Id of the state
        #[arg(short, long)]
        state: String,
    },
    /// List cities ordered by state, then name
    List {
        #[arg(short, long)]
        search: Option<String>,
        /// Only cities of this state id
        #[arg(long)]
        state: Option<String>,
    },
    /// Show a city and its addresses
    Show { id: String },
    Update {
        id: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        state: String,
    },
    /// Delete a city with all of its addresses
    Delete { id: String },
}

#[derive(Debug, Clone, clap::Args)]
pub struct AddressFields {
    /// Street type: Rua, Avenida, Alameda, Travessa, Praça, Largo, Viela, Estrada, Rodovia
    #[arg(long)]
    pub suffix: String,
    #[arg(long)]
    pub street: String,
    #[arg(long)]
    pub neighborhood: String,
    /// Zip code (CEP); '01310100' is stored as '01310-100'
    #[arg(long)]
    pub zip: String,
    /// Id of the city
    #[arg(long)]
    pub city: String,
}

#[derive(Debug, Subcommand)]
pub enum AddressAction {
    Add {
        #[command(flatten)]
        fields: AddressFields,
    },
    /// List addresses ordered by zip code, city, then street name
    List {
        #[arg(short, long)]
        search: Option<String>,
        /// Only addresses in cities of this state id
        #[arg(long)]
        state: Option<String>,
        /// Only addresses of this city id
        #[arg(long)]
        city: Option<String>,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: AddressFields,
    },
    Delete { id: String },
}
