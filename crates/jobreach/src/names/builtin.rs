//! Built-in English → Hebrew transliteration table.
//!
//! LinkedIn shows Israeli names transliterated to Latin script; messages
//! composed in Hebrew want the name back in Hebrew script. Keys are
//! lowercase first names. User-supplied mappings in the database take
//! over where this table has no entry.

pub const BUILTIN_TRANSLATIONS: &[(&str, &str)] = &[
    ("aaron", "אהרון"),
    ("abigail", "אביגיל"),
    ("adam", "אדם"),
    ("adi", "עדי"),
    ("alon", "אלון"),
    ("alona", "אלונה"),
    ("amir", "אמיר"),
    ("amit", "עמית"),
    ("anat", "ענת"),
    ("ariel", "אריאל"),
    ("asaf", "אסף"),
    ("avi", "אבי"),
    ("aviv", "אביב"),
    ("aviva", "אביבה"),
    ("avner", "אבנר"),
    ("avraham", "אברהם"),
    ("ayala", "איילה"),
    ("ayelet", "איילת"),
    ("bar", "בר"),
    ("barak", "ברק"),
    ("benny", "בני"),
    ("boaz", "בועז"),
    ("carmel", "כרמל"),
    ("chen", "חן"),
    ("dafna", "דפנה"),
    ("dan", "דן"),
    ("dana", "דנה"),
    ("daniel", "דניאל"),
    ("daniela", "דניאלה"),
    ("david", "דוד"),
    ("dor", "דור"),
    ("dorit", "דורית"),
    ("doron", "דורון"),
    ("dror", "דרור"),
    ("eden", "עדן"),
    ("efrat", "אפרת"),
    ("eitan", "איתן"),
    ("eli", "אלי"),
    ("eliran", "אלירן"),
    ("eran", "ערן"),
    ("erez", "ארז"),
    ("esther", "אסתר"),
    ("eyal", "איל"),
    ("gal", "גל"),
    ("galit", "גלית"),
    ("gil", "גיל"),
    ("gilad", "גלעד"),
    ("guy", "גיא"),
    ("hadar", "הדר"),
    ("hadas", "הדס"),
    ("haim", "חיים"),
    ("hila", "הילה"),
    ("idan", "עידן"),
    ("ido", "עידו"),
    ("ilan", "אילן"),
    ("ilana", "אילנה"),
    ("inbal", "ענבל"),
    ("inbar", "ענבר"),
    ("iris", "איריס"),
    ("itai", "איתי"),
    ("itamar", "איתמר"),
    ("itay", "איתי"),
    ("keren", "קרן"),
    ("kfir", "כפיר"),
    ("kobi", "קובי"),
    ("lee", "לי"),
    ("liat", "ליאת"),
    ("lilach", "לילך"),
    ("limor", "לימור"),
    ("lior", "ליאור"),
    ("liora", "ליאורה"),
    ("liran", "לירן"),
    ("liron", "לירון"),
    ("lital", "ליטל"),
    ("maayan", "מעיין"),
    ("maor", "מאור"),
    ("matan", "מתן"),
    ("maya", "מאיה"),
    ("meir", "מאיר"),
    ("meital", "מיטל"),
    ("merav", "מירב"),
    ("michael", "מיכאל"),
    ("michal", "מיכל"),
    ("miri", "מירי"),
    ("miriam", "מרים"),
    ("mor", "מור"),
    ("moran", "מורן"),
    ("moshe", "משה"),
    ("moti", "מוטי"),
    ("nadav", "נדב"),
    ("naomi", "נעמי"),
    ("natali", "נטלי"),
    ("natalie", "נטלי"),
    ("natan", "נתן"),
    ("neta", "נטע"),
    ("nir", "ניר"),
    ("nitzan", "ניצן"),
    ("niv", "ניב"),
    ("noa", "נועה"),
    ("noam", "נועם"),
    ("nofar", "נופר"),
    ("noga", "נגה"),
    ("nurit", "נורית"),
    ("ofer", "עופר"),
    ("ofir", "אופיר"),
    ("ohad", "אוהד"),
    ("omer", "עומר"),
    ("omri", "עמרי"),
    ("or", "אור"),
    ("oren", "אורן"),
    ("ori", "אורי"),
    ("orit", "אורית"),
    ("orly", "אורלי"),
    ("osher", "אושר"),
    ("oz", "עוז"),
    ("paz", "פז"),
    ("rachel", "רחל"),
    ("ran", "רן"),
    ("raz", "רז"),
    ("reut", "רעות"),
    ("rinat", "רינת"),
    ("roi", "רועי"),
    ("ron", "רון"),
    ("ronen", "רונן"),
    ("roni", "רוני"),
    ("ronit", "רונית"),
    ("rotem", "רותם"),
    ("roy", "רועי"),
    ("sagi", "שגיא"),
    ("sapir", "ספיר"),
    ("sara", "שרה"),
    ("shachar", "שחר"),
    ("shai", "שי"),
    ("shaked", "שקד"),
    ("shani", "שני"),
    ("sharon", "שרון"),
    ("shay", "שי"),
    ("shir", "שיר"),
    ("shira", "שירה"),
    ("shiri", "שירי"),
    ("shlomi", "שלומי"),
    ("shlomo", "שלמה"),
    ("sigal", "סיגל"),
    ("sivan", "סיון"),
    ("smadar", "סמדר"),
    ("stav", "סתיו"),
    ("tal", "טל"),
    ("tali", "טלי"),
    ("talia", "טליה"),
    ("tamar", "תמר"),
    ("tamir", "תמיר"),
    ("tom", "תום"),
    ("tomer", "תומר"),
    ("tzvi", "צבי"),
    ("udi", "אודי"),
    ("uri", "אורי"),
    ("uriel", "אוריאל"),
    ("vered", "ורד"),
    ("yaakov", "יעקב"),
    ("yael", "יעל"),
    ("yair", "יאיר"),
    ("yaniv", "יניב"),
    ("yarden", "ירדן"),
    ("yaron", "ירון"),
    ("yehuda", "יהודה"),
    ("yoav", "יואב"),
    ("yonatan", "יונתן"),
    ("yoni", "יוני"),
    ("yosef", "יוסף"),
    ("yossi", "יוסי"),
    ("yuval", "יובל"),
    ("zeev", "זאב"),
    ("ziv", "זיו"),
    ("zohar", "זוהר"),
];

/// Looks up a lowercase first name in the built-in table.
pub fn lookup(first_name_lower: &str) -> Option<&'static str> {
    BUILTIN_TRANSLATIONS
        .iter()
        .find(|(english, _)| *english == first_name_lower)
        .map(|(_, hebrew)| *hebrew)
}
