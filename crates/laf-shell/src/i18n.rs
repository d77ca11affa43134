//! Label lookup for the two supported languages

use laf_core::config::Lang;

/// Every user-facing string the shell renders itself
#[derive(Debug)]
pub struct Labels {
    pub language_setting: &'static str,
    pub unlimited_fps: &'static str,
    pub angle_type: &'static str,
    pub webgl2_context: &'static str,
    pub accelerated_canvas: &'static str,
    pub in_process_gpu: &'static str,
    pub enable_timer: &'static str,
    pub show_exit_btn: &'static str,
    pub enable_rpc: &'static str,
    pub exit_top: &'static str,
    pub exit_bottom: &'static str,
    pub exit_disable: &'static str,

    pub restart_msg: &'static str,
    pub clear_cache: &'static str,
    pub reset_option: &'static str,
    pub restart: &'static str,
    pub confirm_clear_cache: &'static str,
    pub cleared_cache_and_restart: &'static str,
    pub confirm_reset_config: &'static str,
    pub reseted_config_and_restart: &'static str,

    pub game_link_title: &'static str,
    pub game_link_label: &'static str,

    pub splash_checking: &'static str,
    pub splash_available: &'static str,
    pub splash_downloading: &'static str,
    pub splash_downloaded: &'static str,
    pub splash_not_available: &'static str,
    pub splash_errored: &'static str,
}

static EN_US: Labels = Labels {
    language_setting: "Language",
    unlimited_fps: "Unlimited FPS",
    angle_type: "ANGLE Backend",
    webgl2_context: "WebGL2 Compute Context",
    accelerated_canvas: "Accelerated 2D Canvas",
    in_process_gpu: "In-Process GPU",
    enable_timer: "Menu Timer",
    show_exit_btn: "Exit Button",
    enable_rpc: "Discord Rich Presence",
    exit_top: "Top",
    exit_bottom: "Bottom",
    exit_disable: "Hidden",

    restart_msg: "This setting takes effect after a restart. Restart the client now?",
    clear_cache: "Clear Cache",
    reset_option: "Reset Settings",
    restart: "Restart Client",
    confirm_clear_cache: "Clear the cache and restart the client?",
    cleared_cache_and_restart: "The cache was cleared. The client will restart.",
    confirm_reset_config: "Reset all settings and restart the client?",
    reseted_config_and_restart: "All settings were reset. The client will restart.",

    game_link_title: "Input a Game Link",
    game_link_label: "URL:",

    splash_checking: "Checking for updates...",
    splash_available: "Update available",
    splash_downloading: "Downloading update",
    splash_downloaded: "Update downloaded. Restarting...",
    splash_not_available: "You are up to date",
    splash_errored: "Update check failed",
};

static JA_JP: Labels = Labels {
    language_setting: "言語",
    unlimited_fps: "FPS制限の解除",
    angle_type: "ANGLEバックエンド",
    webgl2_context: "WebGL2 Compute Context",
    accelerated_canvas: "2D Canvasのハードウェアアクセラレーション",
    in_process_gpu: "In-Process GPU",
    enable_timer: "メニュータイマー",
    show_exit_btn: "終了ボタン",
    enable_rpc: "Discord Rich Presence",
    exit_top: "上",
    exit_bottom: "下",
    exit_disable: "非表示",

    restart_msg: "この設定は再起動後に反映されます。今すぐ再起動しますか?",
    clear_cache: "キャッシュの削除",
    reset_option: "設定のリセット",
    restart: "クライアントの再起動",
    confirm_clear_cache: "キャッシュを削除してクライアントを再起動しますか?",
    cleared_cache_and_restart: "キャッシュを削除しました。クライアントを再起動します。",
    confirm_reset_config: "すべての設定をリセットしてクライアントを再起動しますか?",
    reseted_config_and_restart: "設定をリセットしました。クライアントを再起動します。",

    game_link_title: "ゲームリンクを入力",
    game_link_label: "URL:",

    splash_checking: "アップデートを確認しています...",
    splash_available: "アップデートがあります",
    splash_downloading: "アップデートをダウンロードしています",
    splash_downloaded: "ダウンロード完了。再起動します...",
    splash_not_available: "最新バージョンです",
    splash_errored: "アップデートの確認に失敗しました",
};

impl Labels {
    pub fn for_lang(lang: Lang) -> &'static Labels {
        match lang {
            Lang::EnUs => &EN_US,
            Lang::JaJp => &JA_JP,
        }
    }
}
