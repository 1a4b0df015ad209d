use clap::{Parser, Subcommand};
use news_portal::{
    ApiError, ClientConfig, ClientContext, Env, FileTokenStore, Route,
    views::{self, EditArticleForm, LoginForm, NewsDetail, header},
};
use std::{process::ExitCode, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Terminal client for the news site.
#[derive(Parser)]
#[command(name = "news-portal", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the latest news.
    List,
    /// Show one article with its comments.
    Show { id: i64 },
    /// Render any site path, e.g. `/news/3` or `/news/create`.
    Open { path: String },
    /// Log in and keep the session for later commands.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NEWS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session.
    Logout,
    /// Print the logged-in user.
    Whoami,
    /// Publish an article (verified authors only).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        cover_image: Option<String>,
    },
    /// Edit an article; omitted fields keep their current value.
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        cover_image: Option<String>,
    },
    /// Delete an article.
    Delete { id: i64 },
    /// Comment on an article.
    Comment { news_id: i64, text: String },
    /// Change one of the comments under an article.
    EditComment {
        news_id: i64,
        comment_id: i64,
        text: String,
    },
    /// Remove a comment from an article.
    DeleteComment { news_id: i64, comment_id: i64 },
}

/// main
///
/// Loads configuration, sets up logging, restores the session, then runs one command.
#[tokio::main]
async fn main() -> ExitCode {
    // 1. Configuration
    dotenv::dotenv().ok();
    let args = Args::parse();
    let config = ClientConfig::load();

    // 2. Logging (stderr, so rendered views on stdout stay clean)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "news_portal=warn".into());
    match config.env {
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
    tracing::debug!(api_url = %config.api_url, "client starting in {:?} mode", config.env);

    // 3. Session restore
    let tokens = Arc::new(FileTokenStore::new(config.session_file.clone()));
    let ctx = match ClientContext::new(config, tokens) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    ctx.initialize().await;

    // 4. Command
    let result = run(&ctx, args.command).await;

    if let Some(hint) = login_hint(&result) {
        eprintln!("{hint}");
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", views::error_message(&e, &e.to_string()));
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &ClientContext, command: Command) -> Result<(), ApiError> {
    match command {
        Command::List => print!("{}", views::render_route(ctx, Route::Home).await),
        Command::Show { id } => print!("{}", views::render_route(ctx, Route::Article(id)).await),
        Command::Open { path } => {
            print!("{}", views::render_route(ctx, Route::parse(&path)).await)
        }
        Command::Login { email, password } => {
            LoginForm::new(email, password).submit(ctx).await?;
            print!("{}", header::Header::from_session(&ctx.session).render());
        }
        Command::Logout => {
            header::logout(ctx).await;
            println!("Logged out.");
        }
        Command::Whoami => match ctx.session.current_user() {
            Some(user) => {
                println!("id: {}", user.id);
                println!("email: {}", user.email);
                println!("admin: {}", user.is_admin);
                println!("verified author: {}", user.is_verified_author());
            }
            None => println!("Not logged in."),
        },
        Command::Create {
            title,
            content,
            cover_image,
        } => {
            let mut form = views::CreateArticleForm::new();
            form.fields.title = title;
            form.fields.content = content;
            form.fields.cover_image = cover_image.unwrap_or_default();
            let article = form.submit(ctx).await?;
            println!("Created news #{}", article.id);
        }
        Command::Edit {
            id,
            title,
            content,
            cover_image,
        } => {
            let mut form = EditArticleForm::load(ctx, id).await;
            if let Some(title) = title {
                form.fields.title = title;
            }
            if let Some(content) = content {
                form.fields.content = content;
            }
            if let Some(cover_image) = cover_image {
                form.fields.cover_image = cover_image;
            }
            let article = form.submit(ctx).await?;
            println!("Updated news #{}", article.id);
        }
        Command::Delete { id } => {
            let detail = NewsDetail::load(ctx, id).await;
            if let Some(msg) = detail.state.error() {
                return Err(ApiError::Validation(msg.to_string()));
            }
            if !detail.can_edit(ctx) {
                return Err(ApiError::Validation(
                    "You do not have permission to delete this news".to_string(),
                ));
            }
            detail.delete(ctx).await?;
            println!("Deleted news #{id}");
        }
        Command::Comment { news_id, text } => {
            let mut detail = NewsDetail::load(ctx, news_id).await;
            detail.form.text = text;
            detail.post_comment(ctx).await?;
            print!("{}", detail.render(ctx));
        }
        Command::EditComment {
            news_id,
            comment_id,
            text,
        } => {
            let mut thread = views::CommentThread::load(ctx, news_id).await;
            authorize_comment(ctx, &thread, comment_id)?;
            thread.start_edit(comment_id);
            thread.set_edit_text(text);
            thread.save_edit(ctx).await?;
            print!("{}", thread.render(&ctx.session));
        }
        Command::DeleteComment {
            news_id,
            comment_id,
        } => {
            let mut thread = views::CommentThread::load(ctx, news_id).await;
            authorize_comment(ctx, &thread, comment_id)?;
            thread.delete(ctx, comment_id).await?;
            print!("{}", thread.render(&ctx.session));
        }
    }
    Ok(())
}

// Only when this command was rejected; a stale session dropped at startup stays quiet.
fn login_hint(result: &Result<(), ApiError>) -> Option<&'static str> {
    match result {
        Err(ApiError::Unauthorized(_)) => {
            Some("Not logged in. Run `news-portal login --email <EMAIL>`.")
        }
        _ => None,
    }
}

// Same rule the thread uses to show its Edit/Delete buttons.
fn authorize_comment(
    ctx: &ClientContext,
    thread: &views::CommentThread,
    comment_id: i64,
) -> Result<(), ApiError> {
    if let Some(msg) = thread.state.error() {
        return Err(ApiError::Validation(msg.to_string()));
    }
    let comment = thread
        .comments()
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or(ApiError::NotFound)?;
    if !ctx.session.can_modify(comment.author_id) {
        return Err(ApiError::Validation(
            "You do not have permission to change this comment".to_string(),
        ));
    }
    Ok(())
}
