use clap::{Parser, Subcommand};
use log::{debug, error};

use nowastefood::account::AccountSummary;
use nowastefood::config::load_config;
use nowastefood::model::render_steps;
use nowastefood::{IngredientSelection, Planner, PlannerError, RecipeApi, SignInKind};

/// NoWasteFood - recipes from what is already in your kitchen
#[derive(Parser)]
#[command(name = "nowastefood")]
#[command(about = "Generate recipes from your ingredients and keep favorites", long_about = None)]
struct Cli {
    /// Path to a configuration file (defaults to ./nowastefood.toml if present)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the recipe of the day
    Daily {
        /// Save the recipe to favorites
        #[arg(long)]
        save: bool,
    },

    /// Generate a recipe from the given ingredients
    Generate {
        /// Ingredient names, e.g. eggs "olive oil" spinach
        ingredients: Vec<String>,

        /// Save the recipe to favorites
        #[arg(long)]
        save: bool,
    },

    /// List the built-in ingredient catalogue
    Ingredients {
        /// Only show ingredients containing this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Manage favorite recipes
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Show details of the signed-in account
    Account,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List saved favorites
    List,
    /// Show the steps of a saved favorite
    Show { id: String },
    /// Remove a favorite by id
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command, cli.config.as_deref()).await {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Wire the API from configuration; only commands that reach the backend need it.
fn connect(config_path: Option<&str>) -> Result<(RecipeApi, Planner), PlannerError> {
    let config = load_config(config_path)?;
    debug!("Using API at {}", config.api.base_url);
    let api = RecipeApi::from_config(&config)?;
    let planner = Planner::new(api.clone());
    Ok((api, planner))
}

async fn run(command: Commands, config_path: Option<&str>) -> Result<(), PlannerError> {
    match command {
        Commands::Ingredients { search } => {
            let selection = IngredientSelection::new();
            for item in selection.filter(search.as_deref().unwrap_or("")) {
                println!("{}", item);
            }
            Ok(())
        }
        Commands::Daily { save } => {
            let (_, mut planner) = connect(config_path)?;
            let recipe = planner.load_daily().await.map(|r| r.to_recipe());
            if let Some(daily) = planner.daily() {
                println!("{}", daily);
            }
            match recipe {
                Ok(recipe) if save => planner.add_favorite(&recipe).await.map(|f| {
                    println!("Added to favorites ({})", f.id);
                }),
                other => other.map(|_| ()),
            }
        }
        Commands::Generate { ingredients, save } => {
            let (_, mut planner) = connect(config_path)?;
            for name in &ingredients {
                planner.selection.add_manual(name);
            }
            let recipe = planner.generate_from_selected().await.map(|r| r.to_recipe());
            if let Some(custom) = planner.custom() {
                println!("{}", custom);
            }
            match recipe {
                Ok(recipe) if save => planner.add_favorite(&recipe).await.map(|f| {
                    println!("Added to favorites ({})", f.id);
                }),
                other => other.map(|_| ()),
            }
        }
        Commands::Favorites { action } => {
            let (_, mut planner) = connect(config_path)?;
            match action {
                FavoritesAction::List => planner.refresh_favorites().await.map(|favorites| {
                    if favorites.is_empty() {
                        println!("No favorites yet.");
                    }
                    for favorite in favorites {
                        println!("{}\t{}", favorite.id, favorite.title);
                    }
                }),
                FavoritesAction::Show { id } => {
                    planner.refresh_favorites().await.map(|favorites| {
                        match favorites.iter().find(|f| f.id == id) {
                            Some(favorite) => {
                                println!("{}\n", favorite.title);
                                for (i, line) in render_steps(&favorite.steps).iter().enumerate() {
                                    println!("{}. {}", i + 1, line);
                                }
                            }
                            None => println!("No favorite with id {}", id),
                        }
                    })
                }
                FavoritesAction::Remove { id } => planner
                    .remove_favorite(&id)
                    .await
                    .map(|_| println!("Removed favorite {}", id)),
            }
        }
        Commands::Account => {
            let (api, _) = connect(config_path)?;
            let session = api.current_session().await?;
            let summary = AccountSummary::from_session(&session);
            println!("Username:       {}", summary.username.as_deref().unwrap_or("-"));
            println!("Email:          {}", summary.email.as_deref().unwrap_or("-"));
            println!("Email verified: {}", if summary.email_verified { "yes" } else { "no" });
            println!(
                "Sign-in:        {}",
                match summary.sign_in {
                    SignInKind::Password => "password",
                    SignInKind::Federated => "federated",
                }
            );
            Ok(())
        }
    }
}
