use log::{debug, error};
use macroquad::prelude::*;
use nalgebra::Point2;
use raywall::{cast_scene, BspTree, RandomEdge};
use raywall_viz::{draw_minimap, draw_view, sample_map, Player};

fn window_conf() -> Conf {
    Conf {
        window_title: "raywall".to_owned(),
        window_width: 960,
        window_height: 540,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let polygons = sample_map();
    let tree = match BspTree::build(polygons.clone(), &mut RandomEdge::seeded(7)) {
        Ok(tree) => tree,
        Err(err) => {
            error!("failed to build map: {err}");
            return;
        }
    };
    debug!(
        "map ready: {} polygons, tree depth {}",
        tree.polygon_count(),
        tree.depth()
    );

    let mut player = Player::new(Point2::new(50.0, 30.0), std::f32::consts::FRAC_PI_2);

    loop {
        player.update(&tree, get_frame_time());

        clear_background(BLACK);
        let resolution = (screen_width() as usize / 2).max(1);
        let (buffer, stats) = cast_scene(&tree, &player.camera(), resolution);
        draw_view(&buffer);
        draw_minimap(&polygons, &player, vec2(10.0, 10.0), 1.2);

        draw_text(
            &format!(
                "edges probed: {}/{}  (WASD moves, arrows turn)",
                stats.edges_tested, stats.edges_total
            ),
            10.0,
            screen_height() - 12.0,
            18.0,
            LIGHTGRAY,
        );

        next_frame().await
    }
}
