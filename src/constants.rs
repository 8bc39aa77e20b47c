// Fixed persona text and defaults. All user-visible text is Korean, as the
// reading service answers in Korean.

/// Reading service address used when neither `--endpoint` nor `NERO_ENDPOINT` is set.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";

/// Port for `nero serve` when `--port`/`NERO_PORT` is absent.
pub const DEFAULT_PORT: u16 = 9900;

/// Seed lines shown before any user interaction, in display order.
pub const GREETINGS: [&str; 2] = [
    "안냥! 고양이 타로 상담사 네로다냥 🐈‍⬛",
    "궁금한 것을 말해주면 타로 카드를 통해 조언을 해주겠다냥~",
];

/// Substituted for the reply whenever the exchange fails, whatever the cause.
pub const FALLBACK_REPLY: &str = "죄송해요, 일시적인 오류가 발생했어요 😿";

/// Shown after the last message while a reading is in flight.
pub const LOADING_TEXT: &str = "네로가 타로 카드를 읽고 있어요... 🔮";

pub const INPUT_PLACEHOLDER: &str = "타로점으로 궁금한 것을 말씀해주세요...";

pub const CAT_NAME: &str = "네로";
pub const USER_NAME: &str = "나";
