//! Built-in keyword table.
//!
//! Categories are checked in the order listed and the first keyword hit wins,
//! so the order here is part of the observable behaviour. Keywords are stored
//! lower-case; CJK keywords are unaffected by case folding and also match the
//! original-case text.
#![allow(clippy::non_ascii_literal)]

use super::Category;

pub const RULES: &[(Category, &[&str])] = &[
    (
        Category::Documentation,
        &[
            "excel", "word", "feishu", "飞书", "outlook", "slack", "文献", "论文", "jira",
            "confluence", "notion", "钉钉", "dingtalk",
        ],
    ),
    (
        Category::Coding,
        &["code", "visual studio", "pycharm", "github", "gitlab"],
    ),
    (
        Category::Learning,
        &[
            "jupyter", "python", "coursera", "udemy", "stackoverflow", "documentation",
            "tutorial", "deepseek", "edpuzzle", "github pages", "学习", "教程", "文档",
        ],
    ),
    (
        Category::Social,
        &[
            "wechat", "qq", "outlook", "gmail", "telegram", "discord", "weixin", "teams",
            "meeting", "slack", "whatsapp", "messenger", "微信",
        ],
    ),
    (Category::Entertainment, ENTERTAINMENT),
    (
        Category::System,
        &[
            "explorer", "windows", "settings", "system", "cmd", "powershell", "terminal",
            "文件", "设置", "资源管理器",
        ],
    ),
];

const ENTERTAINMENT: &[&str] = &[
    // media
    "youtube", "netflix", "steam", "game", "spotify", "music", "twitch", "游戏", "wegame",
    // blockbusters
    "cyberpunk", "witcher", "elden ring", "dark souls", "sekiro", "bloodborne", "god of war",
    "spider-man", "last of us", "uncharted", "red dead redemption", "gta", "grand theft auto",
    "assassin", "far cry", "call of duty", "battlefield", "apex legends", "valorant",
    "overwatch", "fortnite", "pubg", "warzone", "counter-strike", "csgo", "cs2",
    "resident evil", "生化危机", "silent hill", "dying light", "dead space", "fallout",
    "skyrim", "elder scrolls", "starfield", "monster hunter", "怪物猎人", "mhw", "mhr",
    "dragons dogma", "zelda", "breath of the wild", "tears of kingdom", "mario", "pokemon",
    "final fantasy", "ff14", "ff16", "kingdom hearts", "yakuza", "like a dragon", "如龙",
    "it takes two", "starwar",
    // moba and competitive
    "league of legends", "英雄联盟", "dota 2", "dota2", "smite", "honor of kings", "王者荣耀",
    "mobile legends", "arena of valor",
    // shooters
    "rainbow six", "left 4 dead", "l4d", "borderlands", "bioshock", "crysis", "half-life",
    "team fortress", "tf2", "titanfall", "halo infinite", "gears of war", "splitgate",
    // online
    "world of warcraft", "guild wars", "new world", "lost ark", "black desert", "黑色沙漠",
    "elder scrolls online", "final fantasy xiv", "star wars", "swtor", "魔兽世界", "剑网3",
    "天涯明月刀", "逆水寒", "梦幻西游", "大话西游",
    // regional titles
    "原神", "genshin", "崩坏", "honkai", "明日方舟", "arknights", "战双帕弥什", "碧蓝航线",
    "azur lane", "少女前线", "girls frontline", "阴阳师", "onmyoji", "第五人格", "identity v",
    "蛋仔派对", "黑神话", "black myth", "wukong", "悟空", "烟雨江湖", "仙剑奇侠传", "古剑奇谭",
    "轩辕剑", "三国志", "三国杀",
    // strategy and simulation
    "civilization", "total war", "stellaris", "crusader kings", "europa universalis",
    "hearts of iron", "cities skylines", "planet zoo", "two point hospital", "planet coaster",
    "rimworld", "oxygen not included", "factorio", "satisfactory", "dyson sphere",
    "戴森球计划", "terraria", "泰拉瑞亚", "starbound", "stardew valley", "星露谷",
    "animal crossing", "动物森友会", "sims", "模拟人生",
    // survival and sandbox
    "minecraft", "我的世界", "方舟", "valheim", "subnautica", "dont starve", "饥荒",
    "sons of the forest", "green hell", "stranded deep", "the long dark", "漫漫长夜",
    "7 days to die", "dayz", "conan exiles",
    // action and adventure
    "tomb raider", "古墓丽影", "batman", "shadow of mordor", "metal gear", "devil may cry",
    "dmc", "bayonetta", "astral chain", "nier automata", "hollow knight", "空洞骑士",
    "celeste", "dead cells", "blasphemous", "salt and sanctuary", "hyper light drifter",
    // racing
    "forza", "gran turismo", "need for speed", "assetto corsa", "wreckfest", "trackmania",
    "mario kart",
    // fighting
    "street fighter", "街霸", "tekken", "铁拳", "mortal kombat", "guilty gear", "blazblue",
    "dragon ball fighterz", "龙珠", "super smash bros", "任天堂明星大乱斗", "brawlhalla",
    // horror
    "outlast", "layers of fear", "little nightmares", "phasmophobia", "dead by daylight",
    "dbd", "friday the 13th", "the quarry", "until dawn", "man of medan",
    // indie
    "undertale", "deltarune", "cuphead", "binding of isaac", "enter the gungeon",
    "slay the spire", "inscryption", "loop hero", "vampire survivors", "brotato", "among us",
    "fall guys", "human fall flat", "getting over it", "i am bread", "goat simulator",
    "untitled goose",
    // card and board
    "hearthstone", "炉石传说", "gwent", "monster train", "mtg arena", "yu-gi-oh", "游戏王",
    "杀戮尖塔",
    // rhythm
    "beat saber", "cytus", "deemo", "phigros", "arcaea", "maimai", "chunithm", "project diva",
    "taiko", "太鼓达人",
    // stores and launchers
    "epic games", "ubisoft connect", "ea app", "gog galaxy", "xbox app", "playstation",
    "battle.net", "rockstar", "riot client",
    // genre terms
    "cheat engine", "mmorpg", "roguelike", "roguelite", "metroidvania",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_stored_lower_case() {
        for (category, keywords) in RULES {
            for keyword in *keywords {
                assert_eq!(
                    keyword.to_lowercase(),
                    *keyword,
                    "{category} keyword {keyword:?} is not lower-case"
                );
            }
        }
    }

    #[test]
    fn test_no_duplicate_keywords_within_a_category() {
        for (category, keywords) in RULES {
            let mut sorted = keywords.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), keywords.len(), "{category} has duplicate keywords");
        }
    }

    #[test]
    fn test_every_rule_category_appears_once() {
        let mut seen: Vec<Category> = RULES.iter().map(|(c, _)| *c).collect();
        let len = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), len);
        assert!(!seen.contains(&Category::Other));
    }
}
