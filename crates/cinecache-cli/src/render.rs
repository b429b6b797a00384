//! Plain-text rendering of catalog results for the terminal.

use cinecache_core::images::ImageResolver;
use cinecache_core::models::{CatalogDetail, CatalogItem, FavoriteItem, ViewMode};
use cinecache_core::utils::{format_date, format_year, pluralize, truncate_string};
use cinecache_core::{KeyValueStore, SearchSession, UserState};

/// Width of the title column in grid view
const TITLE_WIDTH: usize = 40;

/// Overview length in list view
const OVERVIEW_WIDTH: usize = 160;

fn favorite_marker(is_favorite: bool) -> &'static str {
    if is_favorite {
        "*"
    } else {
        " "
    }
}

pub fn print_items<S: KeyValueStore>(
    items: &[&CatalogItem],
    user: &UserState<S>,
    images: &ImageResolver,
) {
    if items.is_empty() {
        println!("No movies found");
        return;
    }

    let mode = user.view_mode();
    for item in items {
        let marker = favorite_marker(user.is_favorite(item.id));
        match mode {
            ViewMode::Grid => println!(
                "{} {:>8}  {:<width$}  {:>4}  {:>4}",
                marker,
                item.id,
                truncate_string(&item.title, TITLE_WIDTH),
                format_year(item.release_year()),
                item.display_rating(),
                width = TITLE_WIDTH,
            ),
            ViewMode::List => {
                println!("{} {}  {}", marker, item.id, item.title);
                println!(
                    "    {}  rating {}",
                    format_date(&item.release_date),
                    item.display_rating()
                );
                if !item.overview.is_empty() {
                    println!("    {}", truncate_string(&item.overview, OVERVIEW_WIDTH));
                }
                println!("    {}", images.poster_url(item.poster_path.as_deref()));
            }
        }
    }
}

pub fn print_search<S: KeyValueStore>(
    session: &SearchSession,
    user: &UserState<S>,
    images: &ImageResolver,
) {
    if session.term().is_empty() {
        println!("Enter a search term");
        return;
    }

    let visible = session.visible_items();
    println!(
        "Results for \"{}\": page {} of {} ({})",
        session.term(),
        session.current_page(),
        session.total_pages(),
        pluralize(session.total_items() as usize, "result"),
    );
    print_items(&visible, user, images);

    if session.category().is_none() && session.current_page() < session.total_pages() {
        println!(
            "More results: cinecache search \"{}\" --pages {}",
            session.term(),
            session.current_page() + 1
        );
    }
}

pub fn print_detail(detail: &CatalogDetail, is_favorite: bool, images: &ImageResolver) {
    let item = &detail.item;
    println!("{} ({})", item.title, format_year(item.release_year()));
    if is_favorite {
        println!("In favorites");
    }
    println!("Released:   {}", format_date(&item.release_date));
    println!("Rating:     {}", item.display_rating());

    let categories = detail.category_names();
    if !categories.is_empty() {
        println!("Categories: {}", categories);
    }
    println!("Backdrop:   {}", images.backdrop_url(item.backdrop_path.as_deref()));
    if let Some(trailer) = &detail.trailer {
        println!("Trailer:    {} ({})", trailer.name, trailer.embed_url());
    }

    if !item.overview.is_empty() {
        println!();
        println!("{}", item.overview);
    }

    if !detail.cast.is_empty() {
        println!();
        println!("Cast");
        for member in &detail.cast {
            println!("  {} as {}", member.name, member.character);
        }
    }
}

pub fn print_favorites(favorites: &[FavoriteItem], mode: ViewMode, images: &ImageResolver) {
    if favorites.is_empty() {
        println!("No favorites yet. Add one with `cinecache fav-add <id>`");
        return;
    }

    println!("{}", pluralize(favorites.len(), "favorite"));
    for fav in favorites {
        match mode {
            ViewMode::Grid => println!(
                "  {:>8}  {:<width$}  {:>4}",
                fav.id,
                truncate_string(&fav.title, TITLE_WIDTH),
                format_year(fav.release_year()),
                width = TITLE_WIDTH,
            ),
            ViewMode::List => {
                println!("  {}  {}", fav.id, fav.title);
                println!("    {}", format_date(&fav.release_date));
                println!("    {}", images.poster_url(fav.poster_path.as_deref()));
            }
        }
    }
}
