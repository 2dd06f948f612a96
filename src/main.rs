use clap::Parser;

mod args;
mod camera;
mod config;
mod detector;
mod draw;
mod font;
mod hud;
mod mesh;
mod output;
mod sprite;
mod state;
mod tracking;
mod ttf;
mod types;

use args::Args;
use camera::CameraFeed;
use config::AppConfig;
use mesh::{MeshConfig, MeshWorker};
use output::WindowOutput;
use sprite::CursorSprite;
use state::AppState;
use tracking::OverlayStyle;
use ttf::FontRenderer;

const BACKGROUND_GRAY: u8 = 40;
const CAPTION_GAP: f32 = 10.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        let cameras = nokhwa::query(nokhwa::utils::ApiBackend::Auto)?;
        println!("Available Cameras:");
        println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
        println!("{}", "-".repeat(60));
        for cam in cameras {
            println!("{:<5} | {:<30} | {:?}", cam.index(), cam.human_name(), cam.misc());
        }
        return Ok(());
    }

    // 0. Load Config
    let config = AppConfig::load()?;

    // 1. Load the cursor sprite. The tracking overlay references it
    // unconditionally, so a missing asset aborts before any window opens.
    let sprite = CursorSprite::load(&args.cursor_image)?.scaled(config.ui.cursor_size * 2);

    // 2. Setup Output
    let canvas_w = config.ui.window_width;
    let canvas_h = config.ui.window_height;
    let mut window = WindowOutput::new("Face Cursor", canvas_w, canvas_h)?;

    // 3. Setup Camera + Detector workers
    let mut feed = CameraFeed::start(args.cam_index as usize, config.defaults.mirror);
    let worker = MeshWorker::start(MeshConfig::default())?;

    let font_renderer = FontRenderer::try_load(&config.ui.font_family);
    let style = OverlayStyle {
        keypoint_radius: config.ui.keypoint_radius,
        marker_color: draw::parse_hex(&config.ui.marker_color_hex),
    };

    let mut state = AppState::new(&config.defaults);
    let mut mouse_down_prev = false;
    let mut canvas = vec![0u8; canvas_w * canvas_h * 3];

    let font_size = config.ui.font_size_pt as f32;
    let text_scale = config.ui.text_scale;

    // Text helpers with TTF / bitmap fallback
    let draw_text = |buf: &mut [u8], x: usize, y: usize, text: &str, color: (u8, u8, u8)| {
        if let Some(fr) = &font_renderer {
            fr.draw_text(buf, canvas_w, canvas_h, x, y, text, color, font_size);
        } else {
            font::draw_text_line(buf, canvas_w, canvas_h, x, y, text, color, text_scale);
        }
    };
    let measure = |text: &str| -> usize {
        if let Some(fr) = &font_renderer {
            fr.measure_width(text, font_size)
        } else {
            font::measure_text_width(text, text_scale)
        }
    };
    let draw_text_centered = |buf: &mut [u8], cx: usize, y: usize, text: &str, color: (u8, u8, u8)| {
        let x = cx.saturating_sub(measure(text) / 2);
        draw_text(buf, x, y, text, color);
    };
    let line_height = if let Some(fr) = &font_renderer {
        fr.measure_height(font_size) + 5
    } else {
        font::measure_text_height(text_scale) + 5
    };

    // 4. Loop
    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        // --- INPUT ---
        // Rising edge of the primary button flips video visibility
        let mouse_down = window.get_mouse_down(minifb::MouseButton::Left);
        if mouse_down && !mouse_down_prev {
            state.toggle_video();
        }
        mouse_down_prev = mouse_down;

        // --- CAMERA & DETECTION ---
        feed.poll();
        if let Some(frame) = feed.latest_frame() {
            worker.offer(frame.clone());
        }
        if let Some(faces) = worker.poll() {
            state.set_faces(faces);
        }

        // --- DRAWING ---
        draw::fill(&mut canvas, BACKGROUND_GRAY);

        let view = feed.view_transform(canvas_w, canvas_h);

        if state.show_video {
            if let (Some(frame), Some(view)) = (feed.latest_frame(), view.as_ref()) {
                let dest_w = (view.dest_width(frame.width() as f32).round() as u32).max(1);
                let mut scaled = image::imageops::resize(
                    frame,
                    dest_w,
                    canvas_h as u32,
                    image::imageops::FilterType::Triangle,
                );
                if feed.mirror {
                    image::imageops::flip_horizontal_in_place(&mut scaled);
                }
                draw::blit_rgb(
                    &mut canvas,
                    canvas_w,
                    canvas_h,
                    &scaled,
                    view.offset_x.round() as i32,
                    0,
                );
            }
        }

        let mut cursor = None;
        if let (Some(face), Some(view)) = (state.faces.first(), view.as_ref()) {
            cursor = tracking::draw_tracking(
                &mut canvas,
                canvas_w,
                canvas_h,
                face,
                state.tracked_index,
                state.show_all_keypoints,
                view,
                &sprite,
                &style,
            );
        }

        // Coordinate caption below the sprite
        if let Some(c) = cursor {
            let caption = format!("x: {}, y: {}", c.x.round() as i64, c.y.round() as i64);
            let caption_y = (c.y + sprite.side() as f32 / 2.0 + CAPTION_GAP) as usize;
            draw_text_centered(&mut canvas, c.x.round().max(0.0) as usize, caption_y, &caption, (255, 255, 255));
        }

        // --- STATUS UI ---
        let status = hud::status_line(feed.ready(), state.faces.len(), state.tracked_index);
        draw_text_centered(&mut canvas, canvas_w / 2, 20, &status, (255, 255, 255));

        draw_text_centered(
            &mut canvas,
            canvas_w / 2,
            canvas_h - line_height,
            "Click to toggle video",
            (200, 200, 200),
        );

        let video_color = if state.show_video { (0, 255, 0) } else { (150, 150, 150) };
        draw_text_centered(
            &mut canvas,
            canvas_w / 2,
            canvas_h - line_height * 2,
            &hud::toggle_line("Video", state.show_video),
            video_color,
        );

        let kp_color = if state.show_all_keypoints { (0, 255, 0) } else { (150, 150, 150) };
        draw_text_centered(
            &mut canvas,
            canvas_w / 2,
            canvas_h - line_height * 3,
            &hud::toggle_line("All Keypoints", state.show_all_keypoints),
            kp_color,
        );

        if feed.ready() {
            draw_text_centered(
                &mut canvas,
                canvas_w / 2,
                canvas_h - line_height * 4,
                &hud::camera_line(feed.ready(), feed.mirror),
                (255, 255, 255),
            );
        }

        window.update(&canvas)?;
    }

    Ok(())
}
